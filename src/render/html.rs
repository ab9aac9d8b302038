use crate::view::DashboardView;

/// Render a self-contained HTML dashboard (data embedded as JSON).
///
/// The template is filled with `replace` rather than `format!()` because the
/// script uses `${x}` template literals and many `{}`.
pub fn render_dashboard_html(view: &DashboardView) -> anyhow::Result<String> {
    // Markup characters only occur inside JSON strings, where the escapes are
    // equivalent, so no record text can open a comment or close the script.
    let json = serde_json::to_string(view)?
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026");

    let refresh = match view.refresh_secs {
        Some(secs) => format!(r#"<meta http-equiv="refresh" content="{secs}">"#),
        None => String::new(),
    };

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
__REFRESH__
<title>__TITLE__</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  h1 { font-size: 20px; margin: 0; }
  h2 { font-size: 16px; margin: 0 0 8px 0; }
  .container { padding: 12px 16px; display: flex; flex-direction: column; gap: 16px; }
  .grid { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
  .panel { border: 1px solid #ddd; border-radius: 8px; padding: 12px; overflow: auto; }

  .filters { display: flex; gap: 8px; flex-wrap: wrap; align-items: center; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .muted { color: #777; font-size: 12px; }
  .empty { text-align: center; padding: 16px; color: #555; }

  table { border-collapse: collapse; width: 100%; margin-top: 8px; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; }
  th { position: sticky; top: 0; background: white; border-bottom: 1px solid #ddd; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
  code { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 13px; }
</style>
</head>
<body>
<header>
  <h1 id="title"></h1>
</header>

<div class="container">
  <div class="panel">
    <h2 id="messagesHeader"></h2>
    <div class="filters" id="filters"></div>
    <div id="messages"></div>
  </div>

  <div class="grid">
    <div class="panel">
      <h2>Send Message</h2>
      <p class="muted">Send with <code>meshdash send --destination &lt;id&gt; --message &lt;text&gt;</code>. Known destinations:</p>
      <div class="filters" id="destinations"></div>
    </div>
    <div class="panel">
      <h2 id="nodesHeader"></h2>
      <div id="nodes"></div>
    </div>
  </div>
</div>

<script>
// Embedded dashboard data (JSON object literal)
const DATA = __DATA__;

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function renderTable(el, columns, rows, emptyText) {
  if (!rows.length) {
    el.innerHTML = `<div class="empty"><b>${escapeHtml(emptyText)}</b></div>`;
    return;
  }
  const head = columns
    .map(c => `<th class="${c.num ? "num" : ""}">${escapeHtml(c.header)}</th>`)
    .join("");
  const body = rows
    .map(r => "<tr>" + columns
      .map(c => `<td class="${c.num ? "num" : ""}">${escapeHtml(r[c.key])}</td>`)
      .join("") + "</tr>")
    .join("");
  el.innerHTML = `<table><thead><tr>${head}</tr></thead><tbody>${body}</tbody></table>`;
}

function renderFilters() {
  const q = DATA.query;
  const el = document.getElementById("filters");
  const tokens = q.tokens.length
    ? q.tokens.map(t => `<span class="pill"><code>${escapeHtml(t)}</code></span>`).join("")
    : `<span class="muted">no filters</span>`;
  el.innerHTML = `
    <span class="pill">match: <b>${q.mode}</b></span>
    ${tokens}
    <span class="muted">${escapeHtml(DATA.messages.count_text)}</span>
  `;
}

function renderMessages() {
  const m = DATA.messages;
  document.getElementById("messagesHeader").textContent = m.header;
  renderTable(document.getElementById("messages"), [
    { key: "source", header: "Source Node" },
    { key: "destination", header: "Destination Node" },
    { key: "snr", header: "SNR", num: true },
    { key: "rssi", header: "RSSI", num: true },
    { key: "portnum", header: "Protocol" },
    { key: "message", header: "Message" },
  ], m.rows, m.empty_text);
}

function renderNodes() {
  const n = DATA.nodes;
  document.getElementById("nodesHeader").textContent = n.header + n.counter;
  renderTable(document.getElementById("nodes"), [
    { key: "node_id", header: "Node ID" },
    { key: "node_name", header: "Node Name" },
    { key: "node_short_name", header: "Node Short Name" },
    { key: "snr", header: "SNR", num: true },
    { key: "last_heard", header: "Last Heard" },
    { key: "battery", header: "Battery Level", num: true },
    { key: "voltage", header: "Battery Voltage", num: true },
  ], n.rows, n.empty_text);
}

function renderDestinations() {
  document.getElementById("destinations").innerHTML = DATA.destinations
    .map(d => `<span class="pill"><code>${escapeHtml(d)}</code></span>`)
    .join("");
}

document.getElementById("title").textContent = DATA.title;
renderFilters();
renderMessages();
renderNodes();
renderDestinations();
</script>
</body>
</html>
"#;

    Ok(TEMPLATE
        .replace("__REFRESH__", &refresh)
        .replace("__TITLE__", &escape_text(&view.title))
        .replace("__DATA__", &json))
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
