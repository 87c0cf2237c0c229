use super::workspace::Workspace;
use super::{builtin, CmapError, Palette};

// test oracle: pick a pgf declaration back apart into its nodes
fn parse_pgf(decl: &str) -> (String, Vec<(f64, [f64; 3])>) {
    let body = decl.strip_prefix("colormap={").unwrap();
    let name_end = body.find('}').unwrap();
    let name = body[..name_end].to_string();

    let mut nodes = Vec::new();
    for line in body.lines() {
        let line = line.trim().trim_end_matches('}');
        if !line.starts_with("rgb(") {
            continue;
        }

        let line = line.strip_prefix("rgb(").unwrap().trim_end_matches(',');
        let mut halves = line.split("pt)=(");
        let pos: f64 = halves.next().unwrap().parse().unwrap();
        let cols: Vec<f64> = halves
            .next()
            .unwrap()
            .trim_end_matches(')')
            .split(',')
            .map(|v| v.parse().unwrap())
            .collect();

        nodes.push((pos, [cols[0], cols[1], cols[2]]));
    }

    (name, nodes)
}

#[test]
fn builtins_resolve() {
    for &name in ["hot", "jet", "tui"].iter() {
        let p = Palette::resolve(name, None).unwrap();
        assert_eq!(p.name(), name);
    }
}

#[test]
fn unknown_name_fails() {
    let res = Palette::resolve("viridis", None);
    assert!(matches!(res, Err(CmapError::UnknownMap(_))));
}

#[test]
fn sample_count_bounds() {
    let p = builtin::jet();

    assert!(matches!(p.sample(0), Err(CmapError::BadSampleCount(0))));
    assert!(matches!(p.sample(1), Err(CmapError::BadSampleCount(1))));

    // two samples are exactly the endpoint colors
    let two = p.sample(2).unwrap();
    assert_eq!(two.colors(), &[[0.0, 0.0, 0.5], [0.5, 0.0, 0.0]]);
}

#[test]
fn sample_positions_cover_unit_interval() {
    for &name in ["hot", "jet", "tui"].iter() {
        let decl = Palette::resolve(name, None)
            .unwrap()
            .sample(100)
            .unwrap()
            .to_pgf();
        let (pgf_name, nodes) = parse_pgf(&decl);

        assert_eq!(pgf_name, name);
        assert_eq!(nodes.len(), 100);
        assert_eq!(nodes[0].0, 0.0);
        assert_eq!(nodes[99].0, 1.0);

        for (i, n) in nodes.iter().enumerate() {
            assert_eq!(n.0, i as f64 / 99.0);
        }
    }
}

#[test]
fn pgf_round_trip() {
    let sampled = builtin::hot().sample(100).unwrap();
    let (_, nodes) = parse_pgf(&sampled.to_pgf());

    for (n, c) in nodes.iter().zip(sampled.colors().iter()) {
        assert_eq!(n.1, *c);
    }
}

#[test]
fn eval_interpolates_linearly() {
    let p = Palette::new(
        "ramp",
        vec![(0.0, [0.0, 0.0, 0.0]), (1.0, [1.0, 0.5, 0.0])],
    );

    assert_eq!(p.eval(0.5), [0.5, 0.25, 0.0]);
    assert_eq!(p.eval(0.0), [0.0, 0.0, 0.0]);
    assert_eq!(p.eval(1.0), [1.0, 0.5, 0.0]);
}

#[test]
fn eval_clamps_outside_control_range() {
    // control points that don't span [0, 1] hold their end colors
    let p = Palette::new(
        "partial",
        vec![(0.2, [0.1, 0.2, 0.3]), (0.8, [0.9, 0.8, 0.7])],
    );

    assert_eq!(p.eval(0.0), [0.1, 0.2, 0.3]);
    assert_eq!(p.eval(1.0), [0.9, 0.8, 0.7]);
}

const WS_TEXT: &str = "# demo workspace

$Colors
count 3
fireRed rgb 0.9/0.2/0.1
deepBlue rgb8 40/80/255
pureGreen hsv 120/1/1
$EndColors

$Maps
count 2
fire fireRed/deepBlue 0/1
traffic fireRed/pureGreen/deepBlue 0/0.5/1
$EndMaps
";

#[test]
fn workspace_parses() {
    let ws = Workspace::parse(WS_TEXT).unwrap();

    assert_eq!(ws.color("fireRed"), Some([0.9, 0.2, 0.1]));
    assert_eq!(
        ws.color("deepBlue"),
        Some([40.0 / 255.0, 80.0 / 255.0, 1.0])
    );
    assert_eq!(ws.color("pureGreen"), Some([0.0, 1.0, 0.0]));

    let fire = ws.find_map("fire").unwrap();
    assert_eq!(fire.name(), "fire");
    assert_eq!(fire.eval(0.0), [0.9, 0.2, 0.1]);
    assert_eq!(fire.eval(1.0), [40.0 / 255.0, 80.0 / 255.0, 1.0]);

    let traffic = ws.find_map("traffic").unwrap();
    assert_eq!(traffic.eval(0.5), [0.0, 1.0, 0.0]);

    assert!(ws.find_map("nope").is_none());
}

#[test]
fn workspace_rejects_undefined_color() {
    let text = "$Colors
count 1
fireRed rgb 0.9/0.2/0.1
$EndColors
$Maps
count 1
fire fireRed/missing 0/1
$EndMaps
";

    assert!(matches!(
        Workspace::parse(text),
        Err(CmapError::BadSource(_))
    ));
}

#[test]
fn workspace_rejects_mismatched_positions() {
    let text = "$Colors
count 2
fireRed rgb 0.9/0.2/0.1
deepBlue rgb 0.1/0.2/0.9
$EndColors
$Maps
count 1
fire fireRed/deepBlue 0/0.5/1
$EndMaps
";

    assert!(matches!(
        Workspace::parse(text),
        Err(CmapError::BadSource(_))
    ));
}

#[test]
fn workspace_rejects_short_sections() {
    let text = "$Colors
count 2
fireRed rgb 0.9/0.2/0.1
$EndColors
$Maps
count 0
$EndMaps
";

    assert!(matches!(
        Workspace::parse(text),
        Err(CmapError::BadSource(_))
    ));
}

#[test]
fn workspace_rejects_unknown_space() {
    let text = "$Colors
count 1
fireRed xyz 0.9/0.2/0.1
$EndColors
$Maps
count 0
$EndMaps
";

    assert!(matches!(
        Workspace::parse(text),
        Err(CmapError::BadSource(_))
    ));
}

#[test]
fn missing_workspace_is_distinct_from_missing_name() {
    let res = Palette::resolve("fire", Some("no_such_workspace.cws".as_ref()));
    assert!(matches!(res, Err(CmapError::SourceNotFound(_))));
}
