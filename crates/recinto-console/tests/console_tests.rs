use std::io::Write;

use chrono::{DateTime, Utc};
use ratatui::{backend::TestBackend, Terminal};
use serde_json::json;

use recinto_console::config::{ConsoleConfig, LogFormat};
use recinto_console::seating_view::render_panel;
use recinto_overlay::SeatingPanel;
use recinto_poll::{Connectivity, PollStatus};
use recinto_protocol::{GlobalState, VoteState};

fn screen(panel: &SeatingPanel, status: &PollStatus) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            render_panel(frame, area, panel, status, 1);
        })
        .unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_714_640_000 + secs, 0).unwrap()
}

fn session_state() -> GlobalState {
    GlobalState::from_value(json!({
        "sesion": {
            "numero_sesion": 7,
            "abierta": true,
            "hora_inicio": "2024-05-02T10:00:00",
            "quorum": 2,
            "concejales": [
                { "nombre": "Ana", "apellido": "Paz", "banca": 1, "presente": true },
                { "nombre": "Luis", "apellido": "Gil", "banca": 2, "presente": true },
                { "nombre": "Eva", "apellido": "Sosa", "banca": 3, "presente": false }
            ],
            "disposicion_bancas": "{\"filas\":[{\"fila\":1,\"columnas\":2},{\"fila\":2,\"columnas\":1}]}",
            "pedidos_uso_de_palabra": [ { "nombre": "Luis", "apellido": "Gil" } ],
            "votaciones": [{
                "id": 4, "estado": "EN_CURSO", "hora_inicio": "2024-05-02T10:30:00",
                "votos": [ { "concejal": { "banca": 1 }, "valor_voto": "Positivo" } ]
            }]
        }
    }))
    .unwrap()
}

#[test]
fn test_config_file_round_trip_through_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[backend]
base_url = "http://concejo.local:8000"
poll_interval_ms = 500

[seating]
vote_result_cooldown_ms = 3000
cell_gap = 2

[logging]
level = "recinto_overlay=debug,info"
format = "json"
"#
    )
    .unwrap();

    let config = ConsoleConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.backend.base_url, "http://concejo.local:8000");
    assert_eq!(config.backend.poll_interval_ms, 500);
    assert_eq!(config.backend.fetch_timeout_ms, 1500);
    assert_eq!(config.seating.cell_gap, 2);
    assert_eq!(config.overlay_config().cooldown, chrono::Duration::seconds(3));
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConsoleConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn test_unknown_keys_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[backend]\nbase_uri = \"http://x\"").unwrap();
    assert!(ConsoleConfig::load(Some(file.path())).is_err());
}

#[test]
fn test_renders_header_seats_and_queue() {
    let mut panel = SeatingPanel::default();
    panel.on_state(&session_state(), at(0)).unwrap();
    let status = PollStatus {
        connectivity: Connectivity::Connected,
        ..Default::default()
    };

    let text = screen(&panel, &status);
    assert!(text.contains("Sesión Nº 7"));
    assert!(text.contains("Concejales 2 de 3 totales"));
    assert!(text.contains("Paz"));
    assert!(text.contains("SI"));
    assert!(text.contains("1. Gil L."));
    assert!(text.contains("En curso"));
    assert!(text.contains("Connected"));
}

#[test]
fn test_closed_vote_shows_its_result() {
    let mut panel = SeatingPanel::default();
    panel.on_state(&session_state(), at(0)).unwrap();

    let mut closed = session_state();
    if let Some(session) = closed.sesion.as_mut() {
        session.votaciones[0].estado = VoteState::Aprobada;
    }
    panel.on_state(&closed, at(1)).unwrap();

    let text = screen(&panel, &PollStatus::default());
    assert!(text.contains("Aprobada · Nº"), "closed vote labelled by its result");
    assert!(!text.contains("Cerrada"));
    assert!(text.contains("SI"), "ballots stay on the seats during cooldown");
}

#[test]
fn test_renders_panel_error_instead_of_seats() {
    let mut state = session_state();
    if let Some(session) = state.sesion.as_mut() {
        session.concejales.pop();
    }
    let mut panel = SeatingPanel::default();
    assert!(panel.on_state(&state, at(0)).is_err());

    let text = screen(&panel, &PollStatus::default());
    assert!(text.contains("Sesión Nº 7"));
    assert!(!text.contains("Paz"));
    assert!(text.contains("roster size=2"));
    assert!(text.contains("Connecting"));
}

#[test]
fn test_no_session_renders_empty_panel() {
    let panel = SeatingPanel::default();
    let status = PollStatus {
        connectivity: Connectivity::Disconnected,
        last_error: Some("No answer within 1.5s".into()),
        ..Default::default()
    };
    let text = screen(&panel, &status);
    assert!(text.contains("Sin sesión abierta"));
    assert!(text.contains("Disconnected"));
    assert!(text.contains("No answer within 1.5s"));
}
