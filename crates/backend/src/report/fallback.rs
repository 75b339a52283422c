//! Deterministic report used when no provider text is available.

use super::generator::GenerationError;
use super::truncate::enforce_char_budget;

pub const LOCAL_REPORT_INTRO: &str = "Reporte de actividades:";

/// Join the activities into one paragraph of sentences behind a fixed intro.
///
/// Each activity is trimmed and forced to end with a period; blank entries
/// are skipped. Fails with [`GenerationError::EmptyReport`] when nothing
/// remains.
pub fn compose_local_report<S: AsRef<str>>(
    activities: &[S],
    max_chars: usize,
) -> Result<String, GenerationError> {
    let sentences: Vec<String> = activities
        .iter()
        .map(|a| a.as_ref().trim())
        .filter(|a| !a.is_empty())
        .map(|a| {
            if a.ends_with('.') {
                a.to_string()
            } else {
                format!("{}.", a)
            }
        })
        .collect();

    if sentences.is_empty() {
        return Err(GenerationError::EmptyReport);
    }

    let paragraph = format!("{} {}", LOCAL_REPORT_INTRO, sentences.join(" "));
    let paragraph = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");

    Ok(enforce_char_budget(&paragraph, max_chars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composes_single_paragraph() {
        let report = compose_local_report(&["revisé código", "escribí pruebas"], 1245).unwrap();
        assert_eq!(
            report,
            "Reporte de actividades: revisé código. escribí pruebas."
        );
        assert!(report.starts_with(LOCAL_REPORT_INTRO));
        assert!(!report.contains('\n'));
    }

    #[test]
    fn test_existing_period_not_doubled() {
        let report = compose_local_report(&["Desplegué la versión 2."], 1245).unwrap();
        assert_eq!(report, "Reporte de actividades: Desplegué la versión 2.");
    }

    #[test]
    fn test_internal_whitespace_collapsed() {
        let report = compose_local_report(&["  reunión   con\tel equipo \n"], 1245).unwrap();
        assert_eq!(report, "Reporte de actividades: reunión con el equipo.");
    }

    #[test]
    fn test_blank_activities_fail() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            compose_local_report(&empty, 1245),
            Err(GenerationError::EmptyReport)
        ));
        assert!(matches!(
            compose_local_report(&["  ", "\t", ""], 1245),
            Err(GenerationError::EmptyReport)
        ));
    }

    #[test]
    fn test_truncated_to_budget() {
        let activities: Vec<String> = (0..100)
            .map(|i| format!("completé la tarea número {}", i))
            .collect();
        let report = compose_local_report(&activities, 300).unwrap();
        assert!(report.chars().count() <= 300);
        assert!(report.ends_with('.'));
    }
}
