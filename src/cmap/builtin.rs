use super::Palette;

// control point renditions of the matplotlib hot and jet scales, plus the
// hand-made tui diverging scale

pub fn named(name: &str) -> Option<Palette> {
    match name {
        "hot" => Some(hot()),
        "jet" => Some(jet()),
        "tui" => Some(tui()),
        _ => None,
    }
}

pub fn hot() -> Palette {
    Palette::new(
        "hot",
        vec![
            (0.0, [0.0416, 0.0, 0.0]),
            (0.365079, [1.0, 0.0, 0.0]),
            (0.746032, [1.0, 1.0, 0.0]),
            (1.0, [1.0, 1.0, 1.0]),
        ],
    )
}

pub fn jet() -> Palette {
    Palette::new(
        "jet",
        vec![
            (0.0, [0.0, 0.0, 0.5]),
            (0.125, [0.0, 0.0, 1.0]),
            (0.375, [0.0, 1.0, 1.0]),
            (0.625, [1.0, 1.0, 0.0]),
            (0.875, [1.0, 0.0, 0.0]),
            (1.0, [0.5, 0.0, 0.0]),
        ],
    )
}

// warm red over white to cool blue
pub fn tui() -> Palette {
    Palette::new(
        "tui",
        vec![
            (0.0, [0.84, 0.14, 0.21]),
            (0.5, [1.0, 1.0, 1.0]),
            (1.0, [0.14, 0.2, 0.84]),
        ],
    )
}
