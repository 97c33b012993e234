use approx::assert_abs_diff_eq;
use solar_exchange::geometry::{Point3D, Polygon3D};
use solar_exchange::state::{SimulationState, SimulationStateElement, SimulationStateHeader};
use solar_exchange::weather::SyntheticWeather;
use solar_exchange::{
    Date, Float, MetaOptions, Scene, SceneElement, SimulationModel, SolarModel, SolarOptions,
    SIGMA,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ir(state: &SimulationState, element: SimulationStateElement) -> Float {
    state.value_of(element).unwrap()
}

fn scene() -> Scene {
    let mut scene = Scene::new();
    let wall = Polygon3D::new(vec![
        Point3D::new(0., 0., 0.),
        Point3D::new(2., 0., 0.),
        Point3D::new(2., 0., 2.),
        Point3D::new(0., 0., 2.),
    ])
    .unwrap();
    scene.push_surface(SceneElement::new("wall", wall)).unwrap();
    let window = Polygon3D::new(vec![
        Point3D::new(0., 3., 0.5),
        Point3D::new(1., 3., 0.5),
        Point3D::new(1., 3., 1.5),
        Point3D::new(0., 3., 1.5),
    ])
    .unwrap();
    scene
        .push_fenestration(SceneElement::new("window", window))
        .unwrap();
    scene.build_accelerator();
    scene
}

#[test]
fn test_ir_zero_net_exchange() {
    init();
    let scene = scene();
    let mut header = SimulationStateHeader::new();

    // Some thermal model registered the temperatures before us
    let wall_front_temp = header
        .push(SimulationStateElement::SurfaceFrontTemperature(0), 20.)
        .unwrap();
    header
        .push(SimulationStateElement::FenestrationBackTemperature(0), 10.)
        .unwrap();

    let mut options = SolarOptions::new();
    options
        .set_n_solar_irradiance_points(4)
        .set_solar_ambient_divisions(500);
    let model = SolarModel::new(&MetaOptions::default(), options, &scene, &mut header).unwrap();
    let mut state = header.build_state();

    let weather = SyntheticWeather {
        direct_normal_radiation: Box::new(|_| Some(0.)),
        diffuse_horizontal_radiation: Box::new(|_| Some(0.)),
        ..SyntheticWeather::default()
    };
    let date = Date {
        month: 1,
        day: 1,
        hour: 0.,
    };
    model.march(date, &weather, &mut state).unwrap();

    let expected = SIGMA * (20. + 273.15 as Float).powi(4);
    assert_abs_diff_eq!(
        ir(&state, SimulationStateElement::SurfaceFrontIRIrradiance(0)),
        expected,
        epsilon = 1e-6
    );
    let expected = SIGMA * (10. + 273.15 as Float).powi(4);
    assert_abs_diff_eq!(
        ir(&state, SimulationStateElement::FenestrationBackIRIrradiance(0)),
        expected,
        epsilon = 1e-6
    );

    // No temperature, no IR
    assert_eq!(ir(&state, SimulationStateElement::SurfaceBackIRIrradiance(0)), 0.0);
    assert_eq!(
        ir(&state, SimulationStateElement::FenestrationFrontIRIrradiance(0)),
        0.0
    );

    // Changing the temperature changes the IR
    state.set(wall_front_temp, 30.).unwrap();
    model.march(date, &weather, &mut state).unwrap();
    let expected = SIGMA * (30. + 273.15 as Float).powi(4);
    assert_abs_diff_eq!(
        ir(&state, SimulationStateElement::SurfaceFrontIRIrradiance(0)),
        expected,
        epsilon = 1e-6
    );
}

#[test]
fn test_view_factors_see_each_other() {
    init();
    let scene = scene();
    let mut header = SimulationStateHeader::new();
    let mut options = SolarOptions::new();
    options
        .set_n_solar_irradiance_points(10)
        .set_solar_ambient_divisions(2000);
    let model = SolarModel::new(&MetaOptions::default(), options, &scene, &mut header).unwrap();

    // The back of the wall faces the window, which shows its front
    let wall = &model.surface_optical_info(0).unwrap().back.view_factors;
    assert!(wall.fenestrations[0].front > 0.0);
    assert_eq!(wall.fenestrations[0].back, 0.0);

    // The front of the wall sees nothing but sky and ground
    let wall = &model.surface_optical_info(0).unwrap().front.view_factors;
    assert_abs_diff_eq!(wall.sky + wall.ground, 1.0, epsilon = 1e-9);

    let window = &model.fenestration_optical_info(0).unwrap().front.view_factors;
    assert!(window.surfaces[0].back > 0.0);
    assert_abs_diff_eq!(window.total(), 1.0, epsilon = 1e-9);
}
