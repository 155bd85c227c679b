//! Browser front-end: a single self-contained HTML page.

use axum::response::Html;

/// `GET /`
pub async fn index() -> Html<String> {
    Html(render_index())
}

fn render_index() -> String {
    INDEX_TEMPLATE
        .replace("{{APP_NAME}}", crate::config::APP_NAME)
        .replace("{{TITLE}}", crate::config::REPORT_TITLE)
        .replace("{{VERSION}}", crate::config::APP_VERSION)
}

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{APP_NAME}}</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 0; display: flex; min-height: 100vh; }
  aside { width: 300px; padding: 1.5rem; background: #f3f4f6; box-sizing: border-box; }
  main { flex: 1; padding: 1.5rem; }
  label { display: block; margin-top: 0.9rem; font-weight: 600; }
  input[type=text], input[type=file] { width: 100%; box-sizing: border-box; }
  .hint { color: #b91c1c; font-size: 0.85rem; min-height: 1.1rem; }
  .ops label { font-weight: normal; margin-top: 0.3rem; }
  .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 1rem; }
  .grid figure { margin: 0; }
  .grid img { max-width: 100%; border: 1px solid #d1d5db; }
  button { margin-top: 1rem; margin-right: 0.5rem; padding: 0.5rem 1rem; }
  #status { margin-top: 1rem; }
</style>
</head>
<body>
<aside>
  <h2>{{APP_NAME}}</h2>
  <form id="form">
    <label for="name">Name</label>
    <input type="text" id="name" name="name" autocomplete="off">
    <label for="registration">Registration Number</label>
    <input type="text" id="registration" name="registration" placeholder="2000-AG-1000" autocomplete="off">
    <div class="hint" id="registration-hint"></div>

    <label for="image">Image</label>
    <input type="file" id="image" name="image" accept="image/png,image/jpeg">
    <label for="image2">Second image (optional)</label>
    <input type="file" id="image2" name="image2" accept="image/png,image/jpeg">

    <label>Operations</label>
    <div class="ops">
      <label><input type="checkbox" name="operation" value="Addition"> Addition</label>
      <label><input type="checkbox" name="operation" value="Subtraction"> Subtraction</label>
      <label><input type="checkbox" name="operation" value="Multiplication"> Multiplication</label>
      <label><input type="checkbox" name="operation" value="Division"> Division</label>
      <label><input type="checkbox" name="select_all" value="on"> Select all</label>
    </div>

    <div id="scalar-row">
      <label for="value">Value: <span id="value-out">50</span></label>
      <input type="range" id="value" name="value" min="0" max="255" step="1" value="50">
    </div>
    <div id="weight-row" hidden>
      <label for="weight">Weight: <span id="weight-out">0.50</span></label>
      <input type="range" id="weight" name="weight" min="0" max="1" step="0.01" value="0.5">
    </div>

    <button type="button" id="preview">Preview</button>
    <button type="button" id="download">Download PDF</button>
  </form>
</aside>
<main>
  <h1>{{TITLE}}</h1>
  <div id="status"></div>
  <div class="grid" id="results"></div>
  <footer><small>v{{VERSION}}</small></footer>
</main>
<script>
const $ = (id) => document.getElementById(id);
const form = $("form");

function pairMode() { return $("image2").files.length > 0; }

function syncMode() {
  const pair = pairMode();
  $("scalar-row").hidden = pair;
  $("weight-row").hidden = !pair;
}

$("image2").addEventListener("change", syncMode);
$("value").addEventListener("input", (e) => { $("value-out").textContent = e.target.value; });
$("weight").addEventListener("input", (e) => {
  $("weight-out").textContent = Number(e.target.value).toFixed(2);
});

let regTimer;
$("registration").addEventListener("input", (e) => {
  clearTimeout(regTimer);
  const value = e.target.value;
  if (!value) { $("registration-hint").textContent = ""; return; }
  regTimer = setTimeout(async () => {
    const res = await fetch("/api/registration?value=" + encodeURIComponent(value));
    const body = await res.json();
    $("registration-hint").textContent = body.valid ? "" : body.message;
  }, 250);
});

function formData() {
  const data = new FormData(form);
  if (pairMode()) { data.delete("value"); } else { data.delete("weight"); data.delete("image2"); }
  return data;
}

async function showError(res) {
  let message = "Request failed (" + res.status + ")";
  try { message = (await res.json()).error.message; } catch (_) {}
  $("status").textContent = message;
}

$("preview").addEventListener("click", async () => {
  $("status").textContent = "Processing...";
  $("results").innerHTML = "";
  const res = await fetch("/api/preview", { method: "POST", body: formData() });
  if (!res.ok) { return showError(res); }
  const body = await res.json();
  $("status").textContent = "";
  for (const item of body.results) {
    const fig = document.createElement("figure");
    const img = document.createElement("img");
    img.src = "data:image/png;base64," + item.png_base64;
    img.alt = item.operation;
    const cap = document.createElement("figcaption");
    cap.textContent = item.operation + " Result (" + item.width + "x" + item.height + ")";
    fig.append(img, cap);
    $("results").append(fig);
  }
});

$("download").addEventListener("click", async () => {
  $("status").textContent = "Generating PDF...";
  const res = await fetch("/api/report", { method: "POST", body: formData() });
  if (!res.ok) { return showError(res); }
  const disposition = res.headers.get("Content-Disposition") || "";
  const match = disposition.match(/filename="([^"]+)"/);
  const blob = await res.blob();
  const link = document.createElement("a");
  link.href = URL.createObjectURL(blob);
  link.download = match ? match[1] : "report.pdf";
  link.click();
  URL.revokeObjectURL(link.href);
  $("status").textContent = "";
});
</script>
</body>
</html>
"#;
