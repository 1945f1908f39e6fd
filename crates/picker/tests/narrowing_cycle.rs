use picker::{Color, GridConfig, GridGenerator, NarrowingSession, Round, Selection, Stage};

#[test]
fn narrowing_converges_on_a_target_colour() {
    let generator = GridGenerator::new(GridConfig::default()).expect("config");
    let mut session = NarrowingSession::new(&generator);
    let target = Color::new(0x33, 0x99, 0xCC);

    for round in Round::ALL {
        let step = i32::from(generator.config().step(round));
        let covering = session
            .current_grid()
            .colors()
            .iter()
            .copied()
            .find(|c| {
                c.channels()
                    .into_iter()
                    .zip(target.channels())
                    .all(|(shown, wanted)| {
                        let low = i32::from(shown) - step / 2;
                        (low..low + step).contains(&i32::from(wanted))
                    })
            })
            .expect("a cell covers the target");
        session
            .select(&generator, Selection::Color(covering))
            .expect("pick");
    }

    assert_eq!(session.last_selected(), Some(target));
    assert_eq!(session.round(), Round::Coarse);
}

#[test]
fn custom_geometry_flows_through_every_round() {
    let config = GridConfig {
        levels: [16, 4, 4],
    };
    let generator = GridGenerator::new(config).expect("config");
    let mut session = NarrowingSession::new(&generator);

    let mut sizes = Vec::new();
    for _ in 0..3 {
        sizes.push(session.current_grid().len());
        session.select(&generator, Selection::Index(0)).expect("pick");
    }
    assert_eq!(sizes, vec![4096, 64, 64]);

    let boundary = generator.generate(Stage::VeryNear(Color::WHITE));
    assert_eq!(boundary.len(), 64);
    assert!(boundary.colors().iter().all(|c| c.distance(Color::WHITE) <= 2));
}
