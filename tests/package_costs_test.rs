use anyhow::Result;
use httpmock::prelude::*;
use tempfile::TempDir;

use backoffice_etl::app::tasks::package_costs::{self, CourierKind};
use backoffice_etl::domain::model::CellValue;
use backoffice_etl::AppConfig;

fn config_for(server: &MockServer, dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.panel.base_url = server.base_url();
    config.panel.api_key = "test-key".to_string();
    config.package_costs.not_found_log = dir
        .path()
        .join("package_not_found.log")
        .display()
        .to_string();
    config
}

fn mock_parcels(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/admin/v3/orders/packages")
            .query_param("deliveryPackageNumbers", "A1");
        then.status(200).json_body(serde_json::json!({
            "results": [{"deliveryPackage": {"deliveryPackageParameters": {"shippingCosts": [
                {"shippingCostNet": 10.0, "shippingCostGross": 12.3, "shippingCostVat": 2.3}
            ]}}}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/admin/v3/orders/packages")
            .query_param("deliveryPackageNumbers", "A2");
        then.status(200).json_body(serde_json::json!({
            "results": [{"errors": {"faultString": "Nie odnaleziono paczki o podanym numerze"}}]
        }));
    });
}

#[tokio::test]
async fn inpost_csv_gets_costs_for_found_parcels_and_sentinels_for_missing() -> Result<()> {
    let server = MockServer::start();
    mock_parcels(&server);

    let dir = TempDir::new()?;
    let file = dir.path().join("paczki.csv");
    std::fs::write(&file, "nr;adres\nA1;Gdynia\nA2;Sopot\n")?;

    let config = config_for(&server, &dir);
    let report = package_costs::run(&file, CourierKind::InPost, &config).await?;
    assert_eq!(report.rows_processed, 2);

    let content = std::fs::read_to_string(&file)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "nr;adres;Netto z panelu;Brutto z panelu;VAT");
    assert_eq!(lines[1], "A1;Gdynia;10,00;12,30;2,30");
    assert_eq!(lines[2], "A2;Sopot;-;-;-");

    // The unknown parcel also lands in the side log.
    let log = std::fs::read_to_string(dir.path().join("package_not_found.log"))?;
    assert!(log.contains("A2"));
    Ok(())
}

#[tokio::test]
async fn dpd_workbook_is_enriched_in_the_parcel_column() -> Result<()> {
    let server = MockServer::start();
    mock_parcels(&server);

    let dir = TempDir::new()?;
    let file = dir.path().join("paczki.xlsx");

    // Parcel numbers live in column L of the export; the header row is row 1.
    let mut sheet = backoffice_etl::Sheet::default();
    sheet.set_cell(0, 0, CellValue::text("Zamówienie"));
    sheet.set_cell(0, 11, CellValue::text("Nr przesyłki"));
    sheet.set_cell(1, 0, CellValue::text("Z-1"));
    sheet.set_cell(1, 11, CellValue::text("A1"));
    sheet.set_cell(2, 0, CellValue::text("Z-2"));
    sheet.set_cell(2, 11, CellValue::text("A2"));
    sheet.set_cell(3, 0, CellValue::text("Z-3"));
    backoffice_etl::adapters::workbook::write_sheet(&file, &sheet)?;

    let config = config_for(&server, &dir);
    let report = package_costs::run(&file, CourierKind::Dpd, &config).await?;
    // The row without a parcel number was skipped without a lookup.
    assert_eq!(report.rows_processed, 2);

    let result = backoffice_etl::adapters::workbook::read_sheet(&file, None)?;
    let netto = result.header_index("Netto z panelu").unwrap();
    let brutto = result.header_index("Brutto z panelu").unwrap();
    let vat = result.header_index("VAT").unwrap();

    assert_eq!(result.cell(1, netto).as_str(), Some("10,00"));
    assert_eq!(result.cell(1, brutto).as_str(), Some("12,30"));
    assert_eq!(result.cell(1, vat).as_str(), Some("2,30"));
    assert_eq!(result.cell(2, netto).as_str(), Some("-"));
    assert_eq!(result.cell(2, vat).as_str(), Some("-"));
    assert!(result.cell(3, netto).is_empty());
    Ok(())
}

#[tokio::test]
async fn gls_csv_strips_asterisks_before_the_lookup() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/admin/v3/orders/packages")
            .query_param("deliveryPackageNumbers", "98765");
        then.status(200).json_body(serde_json::json!({
            "results": [{"deliveryPackage": {"deliveryPackageParameters": {"shippingCosts": [
                {"shippingCostNet": 5.5, "shippingCostGross": 6.77, "shippingCostVat": 1.27}
            ]}}}]
        }));
    });

    let dir = TempDir::new()?;
    let file = dir.path().join("gls.csv");
    std::fs::write(&file, "Nr paczki;waga\n*98765*;1,2\n")?;

    let config = config_for(&server, &dir);
    package_costs::run(&file, CourierKind::Gls, &config).await?;

    mock.assert();
    let content = std::fs::read_to_string(&file)?;
    assert!(content.lines().nth(1).unwrap().ends_with("5,50;6,77;1,27"));
    Ok(())
}
