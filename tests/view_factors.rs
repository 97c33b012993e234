use approx::assert_abs_diff_eq;
use solar_exchange::daylight_coefficients::sampling_tolerance;
use solar_exchange::geometry::{Point3D, Polygon3D};
use solar_exchange::state::SimulationStateHeader;
use solar_exchange::{
    Float, MetaOptions, Scene, SceneElement, SimulationModel, SolarError, SolarModel,
    SolarOptions, PI,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn poly(vertices: &[(Float, Float, Float)]) -> Polygon3D {
    Polygon3D::new(
        vertices
            .iter()
            .map(|(x, y, z)| Point3D::new(*x, *y, *z))
            .collect(),
    )
    .unwrap()
}

/// A unit cube whose surfaces face outwards
fn cube() -> Scene {
    let faces = [
        (
            "floor",
            [(0., 0., 0.), (0., 1., 0.), (1., 1., 0.), (1., 0., 0.)],
        ),
        (
            "roof",
            [(0., 0., 1.), (1., 0., 1.), (1., 1., 1.), (0., 1., 1.)],
        ),
        (
            "south",
            [(0., 0., 0.), (1., 0., 0.), (1., 0., 1.), (0., 0., 1.)],
        ),
        (
            "north",
            [(0., 1., 0.), (0., 1., 1.), (1., 1., 1.), (1., 1., 0.)],
        ),
        (
            "west",
            [(0., 0., 0.), (0., 0., 1.), (0., 1., 1.), (0., 1., 0.)],
        ),
        (
            "east",
            [(1., 0., 0.), (1., 1., 0.), (1., 1., 1.), (1., 0., 1.)],
        ),
    ];
    let mut scene = Scene::new();
    for (name, vertices) in faces {
        scene
            .push_surface(SceneElement::new(name, poly(&vertices)))
            .unwrap();
    }
    scene.build_accelerator();
    scene
}

fn options(n_rays: usize) -> SolarOptions {
    let json = format!(
        "{{
            n_solar_irradiance_points: 10,
            solar_ambient_divisions: {},
            solar_sky_discretization: 1,
        }}",
        n_rays
    );
    json5::from_str(&json).unwrap()
}

#[test]
fn test_closed_cube() {
    init();
    let scene = cube();
    let mut header = SimulationStateHeader::new();
    let n_rays = 1000;
    let model =
        SolarModel::new(&MetaOptions::default(), options(n_rays), &scene, &mut header).unwrap();

    for (i, info) in model.optical_data().surfaces.iter().enumerate() {
        // the inside
        let vf = &info.back.view_factors;
        assert_eq!(vf.sky, 0.0, "surface {} sees the sky", i);
        assert_eq!(vf.ground, 0.0, "surface {} sees the ground", i);
        assert_eq!(vf.air, 0.0);
        assert_abs_diff_eq!(vf.total(), 1.0, epsilon = sampling_tolerance(n_rays));
        // it never sees itself, and only sees the inside of the others
        assert_eq!(vf.surfaces[i].back, 0.0);
        let to_backs: Float = vf.surfaces.iter().map(|t| t.back).sum();
        assert_abs_diff_eq!(to_backs, 1.0, epsilon = 1e-9);

        // the outside never sees the cube
        let vf = &info.front.view_factors;
        let to_cube: Float = vf.surfaces.iter().map(|t| t.front + t.back).sum();
        assert_eq!(to_cube, 0.0);
    }

    let roof = &model.optical_data().surfaces[1].front.view_factors;
    assert_abs_diff_eq!(roof.sky, 1.0, epsilon = 1e-9);
    let floor = &model.optical_data().surfaces[0].front.view_factors;
    assert_abs_diff_eq!(floor.ground, 1.0, epsilon = 1e-9);

    // by symmetry, walls see half sky and half ground
    let south = &model.optical_data().surfaces[2].front.view_factors;
    assert_abs_diff_eq!(south.sky, 0.5, epsilon = 0.05);
    assert_abs_diff_eq!(south.ground, 0.5, epsilon = 0.05);
}

#[test]
fn test_horizontal_skylight() {
    init();
    let mut scene = Scene::new();
    scene
        .push_fenestration(SceneElement::new(
            "skylight",
            poly(&[(0., 0., 3.), (1., 0., 3.), (1., 1., 3.), (0., 1., 3.)]),
        ))
        .unwrap();
    scene.build_accelerator();
    let mut header = SimulationStateHeader::new();
    let model =
        SolarModel::new(&MetaOptions::default(), options(500), &scene, &mut header).unwrap();

    let info = model.fenestration_optical_info(0).unwrap();
    let front = &info.front.view_factors;
    assert_abs_diff_eq!(front.sky, 1.0, epsilon = 1e-9);
    assert_eq!(front.ground, 0.0);
    assert_eq!(front.fenestrations[0].front + front.fenestrations[0].back, 0.0);

    let back = &info.back.view_factors;
    assert_abs_diff_eq!(back.ground, 1.0, epsilon = 1e-9);
    assert_eq!(back.sky, 0.0);
}

#[test]
fn test_dc_matches_sky_view() {
    init();
    // A wall with an overhang
    let mut scene = Scene::new();
    scene
        .push_surface(SceneElement::new(
            "wall",
            poly(&[(0., 0., 0.), (2., 0., 0.), (2., 0., 2.), (0., 0., 2.)]),
        ))
        .unwrap();
    scene
        .push_obstruction(poly(&[
            (-1., 0., 2.2),
            (-1., -1.5, 2.2),
            (3., -1.5, 2.2),
            (3., 0., 2.2),
        ]))
        .unwrap();
    scene.build_accelerator();

    let mut header = SimulationStateHeader::new();
    let model =
        SolarModel::new(&MetaOptions::default(), options(800), &scene, &mut header).unwrap();
    let front = &model.surface_optical_info(0).unwrap().front;
    let vf = &front.view_factors;
    assert!(vf.air > 0.05);
    assert!(vf.sky < 0.5);

    let dc = &front.solar.as_ref().unwrap().dc;
    let n_rows = dc.nrows() as Float;
    let sky_sum: Float = (1..dc.ncols()).map(|c| dc.column(c).sum()).sum::<Float>() / n_rows;
    assert_abs_diff_eq!(sky_sum, PI * vf.sky, epsilon = 1e-9);
    let ground_sum = dc.column(0).sum() / n_rows;
    assert_abs_diff_eq!(ground_sum, PI * vf.ground, epsilon = 1e-9);
}

#[test]
fn test_zero_area() {
    init();
    let mut scene = Scene::new();
    let flat = poly(&[(0., 0., 0.), (1., 0., 0.), (1., 0., 0.), (0., 0., 0.)]);
    let r = scene.push_surface(SceneElement::new("flat", flat));
    assert!(matches!(r, Err(SolarError::InvalidGeometry(_))));

    let scene = cube();
    let mut header = SimulationStateHeader::new();
    let mut opts = options(10);
    opts.set_n_solar_irradiance_points(0);
    let r = SolarModel::new(&MetaOptions::default(), opts, &scene, &mut header);
    assert!(matches!(r, Err(SolarError::InvalidGeometry(_))));

    let mut opts = options(10);
    opts.set_solar_sky_discretization(0);
    let r = SolarModel::new(&MetaOptions::default(), opts, &scene, &mut header);
    assert!(matches!(r, Err(SolarError::InvalidDiscretization(_))));
    assert!(header.is_empty());
}
