use approx::assert_relative_eq;
use demand_forecast::diagnostics::{CarriagewayType, RoadProfile, Severity, SurfaceType};
use demand_forecast::series::HORIZON_YEARS;
use demand_forecast::{DemandPipeline, InterventionCategory, ObservationSet};

fn census_observations() -> ObservationSet {
    ObservationSet::new([
        (2015, 1000.0),
        (2017, 1200.0),
        (2018, 1300.0),
        (2020, 1600.0),
        (2022, 2000.0),
        (2024, 2500.0),
    ])
    .unwrap()
}

fn paved_single() -> RoadProfile {
    RoadProfile::new(SurfaceType::Paved, CarriagewayType::Single)
}

#[test]
fn test_dense_history() {
    let pipeline = DemandPipeline::with_defaults().unwrap();
    let output = pipeline.run(&census_observations(), paved_single()).unwrap();

    assert_eq!(output.dense.start_year(), 2015);
    assert_eq!(output.dense.end_year(), 2024);

    // Observed years are kept exactly
    for (year, value) in census_observations().iter() {
        assert_eq!(output.dense.get(year), Some(value));
    }

    let y2016 = output.dense.get(2016).unwrap();
    assert!(y2016 > 1000.0 && y2016 < 1200.0);
    assert_relative_eq!(y2016, 1000.0 * 1.2_f64.sqrt(), epsilon = 1e-9);
}

#[test]
fn test_forecast_covers_horizon_and_never_decreases() {
    let pipeline = DemandPipeline::with_defaults().unwrap();
    let output = pipeline.run(&census_observations(), paved_single()).unwrap();

    assert_eq!(output.raw.len(), HORIZON_YEARS);
    assert_eq!(output.adjusted.start_year(), 2025);
    assert_eq!(output.adjusted.end_year(), 2045);

    let values = output.adjusted.values();
    assert!(values[0] >= 2500.0);
    for w in values.windows(2) {
        assert!(w[1] >= w[0]);
    }
}

#[test]
fn test_end_to_end_paved_single() {
    let pipeline = DemandPipeline::with_defaults().unwrap();
    let output = pipeline.run(&census_observations(), paved_single()).unwrap();

    assert!(output.model.contains("multiplicative"));
    assert!(output.fallbacks.is_empty());

    let diagnostic = &output.diagnostic;
    assert_eq!(diagnostic.current_year, 2024);
    assert_eq!(diagnostic.current_volume, 2500.0);
    assert_eq!(diagnostic.saturation_year, None);
    assert_eq!(diagnostic.category, InterventionCategory::NormalOperation);
    assert!(diagnostic.growth.short_term_pct >= 0.0);
    assert!(diagnostic.growth.long_term_pct >= 0.0);
}

#[test]
fn test_end_to_end_unpaved() {
    let pipeline = DemandPipeline::with_defaults().unwrap();
    let profile = RoadProfile::from_descriptions("Ripio", "Simple", pipeline.rules());
    let output = pipeline.run(&census_observations(), profile).unwrap();

    assert_eq!(output.diagnostic.category, InterventionCategory::PavingPriority);
    assert_eq!(output.diagnostic.severity(), Severity::Critical);
}

#[test]
fn test_pipeline_is_idempotent() {
    let pipeline = DemandPipeline::with_defaults().unwrap();
    let first = pipeline.run(&census_observations(), paved_single()).unwrap();
    let second = pipeline.run(&census_observations(), paved_single()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_declining_demand_is_held_at_last_census() {
    let observations =
        ObservationSet::new([(2018, 3000.0), (2020, 2500.0), (2022, 2000.0), (2024, 1500.0)])
            .unwrap();
    let pipeline = DemandPipeline::with_defaults().unwrap();
    let output = pipeline.run(&observations, paved_single()).unwrap();

    // The model keeps declining; the floor holds the last census level
    assert!(output.raw.values()[1] < output.raw.values()[0]);
    assert!(output.adjusted.values().iter().all(|v| *v == 1500.0));
    assert_eq!(output.diagnostic.growth.short_term_pct, 0.0);
}

#[test]
fn test_future_saturation_alert() {
    let observations =
        ObservationSet::new([(2015, 3000.0), (2018, 3500.0), (2021, 4100.0), (2024, 4800.0)])
            .unwrap();
    let pipeline = DemandPipeline::with_defaults().unwrap();
    let output = pipeline.run(&observations, paved_single()).unwrap();

    let year = output.diagnostic.saturation_year.expect("saturation expected");
    assert!(year > 2024 && year <= 2045);
    assert_eq!(
        output.diagnostic.category,
        InterventionCategory::FutureAlert { year }
    );
    assert!(output.adjusted.get(year).unwrap() >= 5000.0);
    assert!(output.adjusted.get(year - 1).map_or(true, |v| v < 5000.0));

    // Same volumes on a dual carriageway are fine
    let dual = RoadProfile::new(SurfaceType::Paved, CarriagewayType::Dual);
    let output = pipeline.run(&observations, dual).unwrap();
    assert_eq!(output.diagnostic.category, InterventionCategory::AdequateStandard);
}

#[test]
fn test_saturated_now() {
    let observations = ObservationSet::new([(2020, 5500.0), (2024, 6000.0)]).unwrap();
    let pipeline = DemandPipeline::with_defaults().unwrap();
    let output = pipeline.run(&observations, paved_single()).unwrap();

    assert_eq!(output.diagnostic.saturation_year, Some(2024));
    assert_eq!(output.diagnostic.category, InterventionCategory::SaturatedNow);
}

#[test]
fn test_zero_history_falls_back_to_additive() {
    let observations = ObservationSet::new([(2020, 0.0), (2022, 0.0), (2024, 150.0)]).unwrap();
    let pipeline = DemandPipeline::with_defaults().unwrap();
    let output = pipeline.run(&observations, paved_single()).unwrap();

    assert_eq!(output.dense.get(2021), Some(0.0));
    assert!(output.model.contains("additive"));
    assert_eq!(output.fallbacks.len(), 1);
    assert!(output.adjusted.values().iter().all(|v| *v >= 150.0));
}
