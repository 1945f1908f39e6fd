use shared::protocol::ViewModel;

const TITLE: &str = "Colour Grid";
const DEFAULT_BACKGROUND: &str = "white";
const DEFAULT_FOREGROUND: &str = "black";
const CELL_TEXT: &str = "+";
const INDENT: &str = "    ";

/// Builds the grid page for `view`. `notice` is shown above the grid and
/// must come from the server, never from the request.
pub(crate) fn render_page(view: &ViewModel, notice: Option<&str>) -> String {
    let (mut fg, mut bg) = (DEFAULT_FOREGROUND, DEFAULT_BACKGROUND);
    if view.background_is_reversed {
        std::mem::swap(&mut fg, &mut bg);
    }

    let mut out = page_start(fg, bg);
    if let Some(hex) = &view.last_selected_hex {
        out.push_str(&format!(
            "{INDENT}{INDENT}<div class=\"message\">Last colour selected: <span class=\"colour\">{hex}</span></div>\n"
        ));
    }
    if let Some(notice) = notice {
        out.push_str(&format!(
            "{INDENT}{INDENT}<div class=\"notice\">{notice}</div>\n"
        ));
    }

    out.push_str(&format!(
        "{INDENT}{INDENT}<table class=\"colours\" cellspacing=\"0\">\n"
    ));
    for row in view.cells.chunks(view.columns.max(1)) {
        out.push_str(&format!("{INDENT}{INDENT}{INDENT}<tr>\n"));
        for cell in row {
            out.push_str(&format!(
                "{INDENT}{INDENT}{INDENT}{INDENT}<td style=\"background: {hex}; color: {hex}; --hover-dark: {dark}; --hover-light: {light};\"><a href=\"/pick/{round}/{digits}\" title=\"{hex}\"><span class=\"cell1\">{CELL_TEXT}</span><span class=\"cell2\">{CELL_TEXT}</span></a></td>\n",
                hex = cell.hex,
                dark = cell.preview.black_hex,
                light = cell.preview.white_hex,
                round = view.round.index(),
                digits = cell.hex.trim_start_matches('#'),
            ));
        }
        out.push_str(&format!("{INDENT}{INDENT}{INDENT}</tr>\n"));
    }
    out.push_str(&format!("{INDENT}{INDENT}</table>\n"));

    out.push_str(&format!(
        "{INDENT}{INDENT}<div class=\"grid-metadata\"><span>{} x {} = {} colours: {}-{} / {}</span></div>\n",
        view.rows,
        view.columns,
        view.cell_count(),
        view.first_hex,
        view.last_hex,
        view.step,
    ));
    out.push_str(&format!(
        "{INDENT}{INDENT}<a class=\"reverse\" href=\"/reverse\">reverse</a>\n"
    ));
    out.push_str("    </body>\n</html>\n");
    out
}

fn page_start(fg: &str, bg: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <title>{TITLE}</title>
        <style type="text/css" media="screen">
body, h1, table, tr, td, div, span {{ margin: 0; padding: 0; }}
body {{ font: 14px Arial, sans-serif; margin: 0.5em; background: {bg}; color: {fg}; }}
h1 {{ font-size: 1.5em; font-variant: small-caps; display: inline; }}
.message, .notice {{ float: right; padding: 0.5em 0.5em 0; }}
.message .colour {{ font-weight: bold; }}
.colours {{ width: 100%; }}
.colours td {{ height: 35px; border: 1px solid {bg}; }}
.colours td a {{ display: block; text-decoration: none; color: transparent; text-align: center; }}
.colours td a:hover .cell1 {{ color: var(--hover-dark); }}
.colours td a:hover .cell2 {{ color: var(--hover-light); }}
.grid-metadata {{ display: inline; }}
.reverse {{ float: right; padding: 0 0.5em; color: {fg}; }}
        </style>
    </head>
    <body>
        <h1>{TITLE}</h1>
"#
    )
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
