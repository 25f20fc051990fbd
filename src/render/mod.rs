//! Result rendering
//!
//! Turns a [`GraphResult`] into the payloads a notebook displays: an HTML
//! fragment driving vis-network, the JavaScript loader sent alongside it,
//! and a plain-text fallback.

pub mod palette;

pub use palette::{ColorPalette, ColorPolicy};

use crate::graph::GraphResult;
use serde_json::{json, Value};

const VIS_NETWORK_URL: &str =
    "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js";

/// Sent as `application/javascript` before the HTML so the notebook's
/// RequireJS knows where vis-network lives.
pub const REQUIRE_JS: &str = r#"require.config({paths: {vis: "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min"}});"#;

/// JSON safe to embed inside a `<script>` element
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn graph_data(graph: &GraphResult, palette: &mut ColorPalette) -> (Value, Value) {
    let nodes: Vec<Value> = graph
        .nodes
        .iter()
        .map(|node| {
            json!({
                "id": node.id,
                "label": node.label(),
                "title": node.caption(),
                "color": palette.color_for(node.label()),
            })
        })
        .collect();

    let edges: Vec<Value> = graph
        .relations
        .iter()
        .map(|rel| {
            json!({
                "id": rel.id,
                "from": rel.start_node,
                "to": rel.end_node,
                "label": rel.rel_type,
                "title": rel.caption(),
                "arrows": "to",
            })
        })
        .collect();

    (Value::Array(nodes), Value::Array(edges))
}

/// Self-contained HTML fragment drawing `graph` into `container_id`.
pub fn render_html(graph: &GraphResult, palette: &mut ColorPalette, container_id: &str) -> String {
    let (nodes, edges) = graph_data(graph, palette);
    let container = script_json(&Value::String(container_id.to_string()));

    format!(
        r#"<div id="{id}" style="width: 100%; height: 400px; border: 1px solid #ddd;"></div>
<script type="text/javascript">
(function() {{
  var draw = function(vis) {{
    var nodes = new vis.DataSet({nodes});
    var edges = new vis.DataSet({edges});
    var container = document.getElementById({container});
    new vis.Network(container, {{nodes: nodes, edges: edges}}, {{
      physics: {{stabilization: true}},
      edges: {{font: {{align: "middle"}}}}
    }});
  }};
  if (typeof require === "function") {{
    require(["vis"], draw);
  }} else {{
    var script = document.createElement("script");
    script.src = "{url}";
    script.onload = function() {{ draw(window.vis); }};
    document.head.appendChild(script);
  }}
}})();
</script>"#,
        id = html_escape_attr(container_id),
        nodes = script_json(&nodes),
        edges = script_json(&edges),
        container = container,
        url = VIS_NETWORK_URL,
    )
}

fn html_escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Plain-text listing of every node and relation display string
pub fn render_text(graph: &GraphResult) -> String {
    let mut out = String::new();
    for node in &graph.nodes {
        out.push_str(&node.to_string());
        out.push('\n');
    }
    for rel in &graph.relations {
        out.push_str(&format!("{} ({} -> {})\n", rel, rel.start_node, rel.end_node));
    }
    out
}
