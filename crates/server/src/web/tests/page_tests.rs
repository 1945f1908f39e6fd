use super::*;
use picker::{GridConfig, GridGenerator, NarrowingSession, Selection};

fn session() -> (GridGenerator, NarrowingSession) {
    let generator = GridGenerator::new(GridConfig::default()).expect("config");
    let session = NarrowingSession::new(&generator);
    (generator, session)
}

#[test]
fn page_lists_every_cell_as_a_pick_link() {
    let (_, session) = session();
    let view = session.render();
    let page = render_page(&view, None);

    assert_eq!(page.matches("<td ").count(), 512);
    assert_eq!(page.matches("<tr>").count(), 16);
    let first = view.cells[0].hex.trim_start_matches('#');
    let last = view.cells[511].hex.trim_start_matches('#');
    assert!(page.contains(&format!("href=\"/pick/0/{first}\"")));
    assert!(page.contains(&format!("href=\"/pick/0/{last}\"")));
    assert!(page.contains(&format!("background: {};", view.cells[0].hex)));
    assert!(page.contains("16 x 32 = 512 colours"));
    assert!(!page.contains("Last colour selected"));
}

#[test]
fn pick_links_name_the_round_they_were_shown_in() {
    let (generator, mut session) = session();
    session.select(&generator, Selection::Index(9)).expect("pick");
    let view = session.render();
    let page = render_page(&view, None);
    assert_eq!(page.matches("href=\"/pick/1/").count(), 512);
    assert!(!page.contains("href=\"/pick/0/"));
}

#[test]
fn reversed_background_swaps_page_colours() {
    let (_, mut session) = session();
    let normal = render_page(&session.render(), None);
    assert!(normal.contains("background: white; color: black;"));

    session.toggle_background();
    let reversed = render_page(&session.render(), None);
    assert!(reversed.contains("background: black; color: white;"));
}

#[test]
fn final_pick_is_announced() {
    let (generator, mut session) = session();
    for _ in 0..3 {
        session.select(&generator, Selection::Index(4)).expect("pick");
    }
    let view = session.render();
    let hex = view.last_selected_hex.clone().expect("selected");
    let page = render_page(&view, Some("That colour is no longer on the grid."));
    assert!(page.contains(&format!(
        "Last colour selected: <span class=\"colour\">{hex}</span>"
    )));
    assert!(page.contains("<div class=\"notice\">That colour is no longer on the grid.</div>"));
}
