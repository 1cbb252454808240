// src/server/inject.rs

pub const CLIENT_SCRIPT_PATH: &str = "/__sitepipe/livereload.js";
pub const WEBSOCKET_PATH: &str = "/__sitepipe/ws";

/// Tag inserted into every served HTML page.
pub fn client_script_tag() -> String {
    format!(r#"<script src="{CLIENT_SCRIPT_PATH}"></script>"#)
}

/// Insert the live-reload script before the last `</body>` (any case), or
/// append it when the page has no body end tag.
pub fn inject_client_script(html: &str) -> String {
    let tag = client_script_tag();
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..idx]);
            out.push_str(&tag);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{html}{tag}"),
    }
}

/// Browser side of the live-reload protocol.
pub const CLIENT_SCRIPT: &str = r#"(function () {
  var proto = location.protocol === "https:" ? "wss://" : "ws://";
  var retry = 500;

  function refreshCss(path) {
    var links = document.querySelectorAll('link[rel="stylesheet"]');
    var matched = false;
    links.forEach(function (link) {
      var url = new URL(link.href, location.href);
      if (url.pathname.replace(/^\//, "") === path.replace(/^\//, "")) {
        url.searchParams.set("__sitepipe", Date.now());
        link.href = url.toString();
        matched = true;
      }
    });
    if (!matched) location.reload();
  }

  function connect() {
    var ws = new WebSocket(proto + location.host + "/__sitepipe/ws");
    ws.onopen = function () { retry = 500; };
    ws.onmessage = function (ev) {
      var msg = JSON.parse(ev.data);
      if (msg.type === "css") refreshCss(msg.path);
      else location.reload();
    };
    ws.onclose = function () {
      setTimeout(connect, retry);
      retry = Math.min(retry * 2, 5000);
    };
  }

  connect();
})();
"#;
