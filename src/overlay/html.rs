//! HTML fragment for the browser output area
//!
//! Markup mirrors what the page stylesheet targets: `bo`/`bi`/`bw` wrap a
//! mention, `annotation-popup` holds the panel, one `annotation-tag` per
//! candidate with `predicted_valid` on the predicted one. Checkboxes carry
//! `data-start`, `data-end` and `data-qid` so the page can read them back.

use super::{CandidatePanel, CandidateRow, RenderNode, RenderTree};

pub fn to_html(tree: &RenderTree) -> String {
    let mut out = String::from("<div>");
    for node in &tree.nodes {
        match node {
            RenderNode::PlainText { content } => push_plain_text(&mut out, content),
            RenderNode::AnnotatedSpan {
                index,
                mention,
                panel,
            } => {
                out.push_str(&format!(
                    r#"<span class="bo" data-annotation-id="{}"><span class="bi"><span class="bw">{}</span></span>"#,
                    index,
                    escape(mention)
                ));
                push_panel(&mut out, panel);
                out.push_str("</span>");
            }
        }
    }
    out.push_str("</div>");
    out
}

/// Plain runs keep their line structure
fn push_plain_text(out: &mut String, content: &str) {
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<br/>");
        }
        out.push_str(&escape(line));
    }
}

fn push_panel(out: &mut String, panel: &CandidatePanel) {
    out.push_str(r#"<div class="annotation-popup">"#);
    for row in &panel.rows {
        push_row(out, row);
    }
    out.push_str("</div>");
}

fn push_row(out: &mut String, row: &CandidateRow) {
    let class = if row.predicted {
        "annotation-tag predicted_valid"
    } else {
        "annotation-tag"
    };
    out.push_str(&format!(r#"<div class="{}">"#, class));
    out.push_str(&format!(
        r#"<a href="{}" target="_blank">{}</a>"#,
        escape(&row.url),
        escape(&row.label)
    ));

    out.push_str("<label>");
    if let Some(control) = &row.control {
        out.push_str(&format!(
            r#"<input type="checkbox" data-start="{}" data-end="{}" data-qid="{}"{}/>"#,
            control.start,
            control.end,
            escape(&control.candidate_id),
            if control.checked { " checked" } else { "" }
        ));
    }
    out.push_str(&format!("<br /><span>{}</span>", escape(&row.description)));
    out.push_str(&format!(
        r#"<br /><span class="scores">{}</span>"#,
        escape(&row.scores)
    ));
    out.push_str(&format!(
        r#"<br /><span class="scores">{}</span>"#,
        escape(&row.counts)
    ));
    if let Some(score) = &row.score {
        out.push_str(&format!(
            r#"<br /><span class="scores">{}</span>"#,
            escape(score)
        ));
    }
    out.push_str("</label></div>");
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
