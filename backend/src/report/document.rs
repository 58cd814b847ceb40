//! Document rendering collaborator used by the export path.

use std::fmt::Write as _;

use super::error::DocumentError;
use super::model::ReportModel;
use crate::models::{Reading, Variable};
use crate::services::TimeWindow;

/// Placeholder shown for absent values.
pub const ABSENT_DISPLAY: &str = "—";

/// A finished, downloadable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub content_type: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// External document rendering collaborator.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, report: &ReportModel) -> Result<RenderedDocument, DocumentError>;
}

/// Reading as read from the device, or the absent placeholder.
pub fn format_reading(value: Reading) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| ABSENT_DISPLAY.to_string())
}

/// One-decimal figure, or the absent placeholder.
pub fn format_tenth(value: Reading) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| ABSENT_DISPLAY.to_string())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// File name derived from the patient id, restricted to safe characters.
pub fn document_file_name(report: &ReportModel, extension: &str) -> String {
    let id: String = report
        .patient()
        .id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if id.is_empty() {
        format!("informe.{}", extension)
    } else {
        format!("informe_{}.{}", id, extension)
    }
}

const STYLE: &str = "body{font-family:Arial,sans-serif;padding:20px;background-color:#f9f9f9}\
.contenedor{max-width:1200px;margin:auto}\
.graficos img{display:block;width:100%;margin-bottom:30px;border:1px solid #ccc}\
table{width:100%;border-collapse:collapse;margin-bottom:30px}\
th,td{border:1px solid #ccc;padding:6px 8px;text-align:center}\
th{background-color:#e0e0e0}";

/// Self-contained printable HTML document.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDocumentRenderer;

impl HtmlDocumentRenderer {
    /// Render the document body as a string.
    pub fn render_html(&self, report: &ReportModel) -> Result<String, std::fmt::Error> {
        let patient = report.patient();
        let mut html = String::new();

        write!(
            html,
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Monitor de Presión</title><style>{}</style></head><body><div class=\"contenedor\">",
            STYLE
        )?;
        write!(html, "<h1>Monitor de Presión Arterial</h1>")?;
        write!(
            html,
            "<p><strong>Paciente:</strong> {} &middot; <strong>ID:</strong> {} &middot; <strong>Edad:</strong> {} &middot; <strong>Intervalo:</strong> {} min</p>",
            escape_html(&patient.full_name()),
            escape_html(&patient.id),
            patient.age,
            patient.sampling_minutes
        )?;

        write!(html, "<h2>Resumen</h2><table><tr><th>Variable</th><th>Periodo</th><th>Máx</th><th>Mín</th><th>Media</th><th>DE</th></tr>")?;
        for variable in Variable::ALL {
            for window in TimeWindow::ALL {
                let summary = report.summaries().get(variable, window);
                write!(
                    html,
                    "<tr><td>{} ({})</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    variable.label(),
                    variable.unit(),
                    window.label(),
                    format_reading(summary.max),
                    format_reading(summary.min),
                    format_tenth(summary.mean),
                    format_tenth(summary.stdev)
                )?;
            }
        }
        write!(html, "</table>")?;

        if !report.charts().is_empty() {
            write!(html, "<div class=\"graficos\">")?;
            for variable in super::model::PLOTTED_VARIABLES {
                if let Some(image) = report.chart(variable) {
                    write!(
                        html,
                        "<h2>{}</h2><img src=\"{}\" alt=\"{}\">",
                        variable.label(),
                        image.to_data_url(),
                        variable.key()
                    )?;
                }
            }
            write!(html, "</div>")?;
        }

        write!(
            html,
            "<h2>Tabla de Mediciones</h2><table><tr><th>#</th><th>Hora</th><th>Fecha</th><th>Sistólica</th><th>Diastólica</th><th>PAM</th><th>Pulso</th><th>PP</th><th>DP</th></tr>"
        )?;
        for record in report.records() {
            let hour = record
                .time
                .map(|t| t.label())
                .unwrap_or_else(|| ABSENT_DISPLAY.to_string());
            let date = record
                .time
                .and_then(|t| t.date)
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| ABSENT_DISPLAY.to_string());
            write!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                record.index,
                hour,
                date,
                format_reading(record.systolic),
                format_reading(record.diastolic),
                format_reading(record.mean_arterial),
                format_reading(record.pulse_rate),
                format_reading(record.pulse_pressure),
                format_reading(record.double_product)
            )?;
        }
        write!(html, "</table></div></body></html>")?;

        Ok(html)
    }
}

impl DocumentRenderer for HtmlDocumentRenderer {
    fn render(&self, report: &ReportModel) -> Result<RenderedDocument, DocumentError> {
        let html = self
            .render_html(report)
            .map_err(|e| DocumentError::Render(e.to_string()))?;

        Ok(RenderedDocument {
            content_type: "text/html; charset=utf-8".to_string(),
            file_name: document_file_name(report, "html"),
            bytes: html.into_bytes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlignedRecord, PatientInfo, SampleTime};
    use crate::report::chart::ChartImage;
    use crate::services::derive;
    use std::collections::BTreeMap;

    fn report(id: &str) -> ReportModel {
        let records = derive(vec![
            AlignedRecord {
                systolic: Some(120.0),
                diastolic: Some(80.0),
                pulse_rate: Some(70.0),
                time: Some(SampleTime {
                    hour: 8.0,
                    minute: Some(30.0),
                    date: None,
                }),
                ..AlignedRecord::empty(1)
            },
            AlignedRecord {
                systolic: Some(130.0),
                ..AlignedRecord::empty(2)
            },
        ]);
        let charts = BTreeMap::from([(
            "systolic".to_string(),
            ChartImage::new("image/png", vec![1, 2, 3]),
        )]);
        ReportModel::from_parts(
            PatientInfo {
                name: "Ana".to_string(),
                surname: "<García>".to_string(),
                id: id.to_string(),
                age: 54,
                sampling_minutes: 20,
            },
            records,
            charts,
        )
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_reading(Some(120.0)), "120");
        assert_eq!(format_reading(Some(0.0)), "0");
        assert_eq!(format_reading(None), "—");
        assert_eq!(format_tenth(Some(125.0)), "125.0");
        assert_eq!(format_tenth(Some(7.1)), "7.1");
        assert_eq!(format_tenth(None), "—");
    }

    #[test]
    fn test_html_document_contents() {
        let doc = HtmlDocumentRenderer.render(&report("HC-001")).unwrap();
        let html = String::from_utf8(doc.bytes).unwrap();

        assert_eq!(doc.content_type, "text/html; charset=utf-8");
        assert_eq!(doc.file_name, "informe_HC-001.html");
        assert!(html.contains("Monitor de Presión Arterial"));
        assert!(html.contains("&lt;García&gt;"));
        assert!(html.contains("data:image/png;base64,AQID"));
        assert!(html.contains("<td>1</td><td>08:30</td>"));
        // second sample has no diastolic, so no pulse pressure either
        assert!(html.contains("<td>130</td><td>—</td>"));
        assert!(html.contains("<td>125.0</td><td>7.1</td>"));
    }

    #[test]
    fn test_file_name_is_sanitized() {
        assert_eq!(document_file_name(&report("../etc/x"), "html"), "informe_etcx.html");
        assert_eq!(document_file_name(&report("  "), "pdf"), "informe.pdf");
    }
}
