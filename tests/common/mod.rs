//! Shared fixtures: small evaluation matrices written as real .xlsx workbooks

#![allow(dead_code)]

use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;

/// A cell in a fixture grid
pub enum Cell {
    Blank,
    Text(&'static str),
    Num(f64),
}

use Cell::{Blank, Num, Text};

/// Two Belem/PA rows and one CEAGESP/SP-only row, Dimension explicit on rows 1 and 3.
///
/// | Dim | Sub | Nº | Question | Belem/PA: Points %Sub %Dim Result Sum Response | CEAGESP/SP: Points |
pub fn standard_grid() -> Vec<Vec<Cell>> {
    vec![
        vec![
            Text("Dimensão"),
            Text("Subdimensão"),
            Text("Nº"),
            Text("Perguntas"),
            Text("Belem/PA"),
            Blank,
            Blank,
            Blank,
            Blank,
            Blank,
            Text("CEAGESP/SP"),
        ],
        vec![
            Blank,
            Blank,
            Blank,
            Blank,
            Text("Pontos"),
            Text("% da Subdimensão"),
            Text("% Total da Dimensão"),
            Text("Resultado da Matriz"),
            Text("Soma (pts)"),
            Text("Resposta"),
            Text("Pontos"),
        ],
        vec![
            Text("Gestão"),
            Text("Planejamento"),
            Num(1.0),
            Text("Existe plano?"),
            Num(10.0),
            Num(0.5),
            Num(0.25),
            Num(0.1),
            Num(10.0),
            Text("Sim"),
            Num(3.0),
        ],
        vec![
            Blank,
            Text("Execução"),
            Num(2.0),
            Text("O plano é seguido?"),
            Num(20.0),
            Num(1.0),
            Num(0.75),
            Num(0.3),
            Num(20.0),
            Text("Parcialmente"),
            Num(4.0),
        ],
        vec![
            Text("Logística"),
            Text("Transporte"),
            Num(3.0),
            Text("Há frota própria?"),
            Num(5.0),
            Num(1.0),
            Num(1.0),
            Num(0.5),
            Num(5.0),
            Text("Não"),
            Num(5.0),
        ],
    ]
}

/// Write `grid` as the only sheet of a new workbook
pub fn write_workbook(path: &Path, sheet: &str, grid: &[Vec<Cell>]) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;

    for (r, row) in grid.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (r as u32, c as u16);
            match cell {
                Blank => {}
                Text(s) => {
                    worksheet.write_string(r, c, *s)?;
                }
                Num(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
            }
        }
    }

    workbook.save(path)
}

/// Write the standard matrix to `dir/matrix.xlsx`
pub fn write_standard_matrix(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("matrix.xlsx");
    write_workbook(&path, "Matriz", &standard_grid()).expect("write fixture workbook");
    path
}

/// Write a `.evalmatrix/config.toml` pointing at `matrix.xlsx` in `dir`
pub fn write_config(dir: &Path) -> std::path::PathBuf {
    let config_dir = dir.join(".evalmatrix");
    std::fs::create_dir_all(&config_dir).expect("create config dir");
    let path = config_dir.join("config.toml");
    std::fs::write(
        &path,
        r#"default_dashboard = "ceasas"

[[dashboards]]
name = "ceasas"
title = "Test Matrix"
path = "matrix.xlsx"
sheet = "Matriz"

[[dashboards]]
name = "ceagesp"
path = "matrix.xlsx"
pinned_entity = "CEAGESP/SP"
"#,
    )
    .expect("write config");
    path
}
