use crate::prelude::*;
use std::str::FromStr;

#[test]
fn default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.timescale, TimeScale::GPST);
    assert_eq!(cfg.constellations.len(), 2);
    assert_eq!(cfg.solver.min_sv, 5);
    assert_eq!(cfg.solver.max_iterations, 20);
    assert!(!cfg.solver.iterate_transmission_time);
    assert_eq!(cfg.tropo_model, TropoModel::Saastamoinen);

    let gps = cfg.setup(Constellation::GPS).unwrap();
    assert_eq!(gps.min_elevation_deg, 20.0);
    assert_eq!(gps.signal, "L1");

    let galileo = cfg.setup(Constellation::Galileo).unwrap();
    assert_eq!(galileo.min_elevation_deg, 15.0);
    assert_eq!(galileo.signal, "E1");

    assert!(cfg.setup(Constellation::BeiDou).is_none());
}

#[test]
fn config_presets() {
    let gps = Config::gps_only();
    assert_eq!(gps.constellations, vec![ConstellationSetup::gps_l1()]);

    let galileo = Config::galileo_only();
    assert_eq!(galileo.constellations, vec![ConstellationSetup::galileo_e1()]);
    assert_eq!(galileo.timescale, TimeScale::GST);

    let raw = gps.without_modeling();
    assert_eq!(raw.constellations, gps.constellations);
    assert!(!raw.modeling.earth_rotation);
    assert!(!raw.modeling.sv_clock_bias);
    assert!(!raw.modeling.tropo_delay);
}

#[test]
fn frequency_band() {
    let setup = ConstellationSetup::gps_l1();
    assert!(setup.frequency_match(1575.42E6));
    assert!(setup.frequency_match(1575.42E6 + 1.0E6));
    assert!(!setup.frequency_match(1227.60E6));
    assert!(!setup.frequency_match(1176.45E6));
}

#[test]
fn tropo_model_from_str() {
    assert_eq!(TropoModel::from_str("saas").unwrap(), TropoModel::Saastamoinen);
    match TropoModel::from_str("Hopfield") {
        Err(ConfigError::UnknownTropoModel(name)) => assert_eq!(name, "hopfield"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
#[cfg(feature = "serde")]
fn config_deserialization() {
    let content = r#"
{
    "timescale": "GST",
    "tropo_model": "Niel",
    "modeling": {
        "iono_delay": false
    },
    "solver": {
        "max_iterations": 10,
        "min_sv": 6,
        "weighting": "Uniform"
    }
}"#;

    let cfg: Config = serde_json::from_str(content).unwrap();
    assert_eq!(cfg.timescale, TimeScale::GST);
    assert_eq!(cfg.tropo_model, TropoModel::Niel);
    assert!(!cfg.modeling.iono_delay);
    assert!(cfg.modeling.tropo_delay, "omitted fields use default values");
    assert_eq!(cfg.solver.max_iterations, 10);
    assert_eq!(cfg.solver.min_sv, 6);
    assert_eq!(cfg.solver.weighting, Weighting::Uniform);
    assert_eq!(cfg.solver.convergence_m, 1.0E-4);
    assert_eq!(cfg.constellations.len(), 2, "default constellations");
}

#[test]
#[cfg(feature = "serde")]
fn constellation_setup_deserialization() {
    let content = r#"
{
    "constellations": [
        {
            "constellation": "GPS",
            "min_elevation_deg": 10.0,
            "signal": "L1"
        }
    ]
}"#;

    let cfg: Config = serde_json::from_str(content).unwrap();
    assert_eq!(cfg.constellations.len(), 1);

    let gps = &cfg.constellations[0];
    assert_eq!(gps.constellation, Constellation::GPS);
    assert_eq!(gps.min_elevation_deg, 10.0);
    assert_eq!(gps.carrier_frequency_hz, 1575.42E6);
}
