use demand_forecast::config::load_from_path;
use demand_forecast::{
    DataLoader, DemandPipeline, ForecastError, InterventionCategory, SegmentRepository,
};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

const DATASET: &str = "\
ROL,ROL NUEVO,NOMBRE DEL CAMINO,ESTACIÓN,SECTOR,CLASIFICACIÓN,TIPO DE CARPETA,CALZADA,TMDA 2015,TMDA 2017,TMDA 2018,TMDA 2020,TMDA 2022,TMDA 2024
L-11,L-11,Camino A,E-01,,Local,Asfalto,Simple,1000,1200,1300,1600,2000,2500
L-11,L-11,Camino A,E-02,,Local,Ripio,Simple,300,320,,400,,450
L-11,L-11,Camino A,E-03,,Local,Asfalto,Simple,,,,,,900
";

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_workflow() {
    let dataset = write_temp(DATASET);
    let repo = DataLoader::from_csv(dataset.path()).unwrap();
    let pipeline = DemandPipeline::with_defaults().unwrap();

    let record = repo.find("L-11", "Camino A (E-01)").unwrap();
    let report = pipeline.run_segment(record).unwrap();

    assert_eq!(report.kpis.current_year, 2024);
    assert_eq!(report.kpis.current_volume, 2500.0);
    assert_eq!(report.kpis.short_term_year, 2026);
    assert_eq!(report.kpis.horizon_year, 2045);
    assert_eq!(report.projection.len(), 21);
    assert_eq!(report.projection[0].year, 2025);
    assert_eq!(report.history.start_year(), 2015);
    assert_eq!(report.diagnostic.category, InterventionCategory::NormalOperation);

    let text = report.to_string();
    assert!(text.contains("Road demand report: Camino A"));
    assert!(text.contains("Census 2024"));
    assert!(text.contains(report.diagnostic.category.title()));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["segment"]["station"], "E-01");
    assert_eq!(json["kpis"]["current_year"], 2024);
    assert_eq!(json["history"]["2015"], 1000.0);
    assert_eq!(json["forecast"].as_object().unwrap().len(), 21);
}

#[test]
fn test_unpaved_segment_with_gaps() {
    let dataset = write_temp(DATASET);
    let repo = DataLoader::from_csv(dataset.path()).unwrap();
    let pipeline = DemandPipeline::with_defaults().unwrap();

    let record = repo.find("L-11", "Camino A (E-02)").unwrap();
    assert_eq!(record.missing_years(), vec![2018, 2022]);

    let report = pipeline.run_segment(record).unwrap();
    assert_eq!(report.history.len(), 10);
    assert_eq!(report.diagnostic.category, InterventionCategory::PavingPriority);
}

#[test]
fn test_segment_with_one_census_fails_alone() {
    let dataset = write_temp(DATASET);
    let repo = DataLoader::from_csv(dataset.path()).unwrap();
    let pipeline = DemandPipeline::with_defaults().unwrap();

    let results: Vec<_> = repo
        .segments("L-11")
        .into_iter()
        .map(|record| pipeline.run_segment(record))
        .collect();

    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(matches!(
        results[2],
        Err(ForecastError::InsufficientObservations { found: 1, required: 2 })
    ));
}

#[test]
fn test_pipeline_from_config_file() {
    let config_file = write_temp(
        r#"
        [model]
        damping = 0.8

        [diagnostic]
        saturation_threshold = 2000.0
        "#,
    );
    let config = load_from_path(config_file.path()).unwrap();
    let pipeline = DemandPipeline::from_config(&config).unwrap();

    let dataset = write_temp(DATASET);
    let repo = DataLoader::from_csv(dataset.path()).unwrap();
    let record = repo.find("L-11", "Camino A (E-01)").unwrap();
    let report = pipeline.run_segment(record).unwrap();

    // 2500 veh/day is already beyond the lowered threshold
    assert_eq!(report.diagnostic.saturation_year, Some(2024));
    assert_eq!(report.diagnostic.category, InterventionCategory::SaturatedNow);
}
