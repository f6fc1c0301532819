//! Status text → attendance signal.

use tally_core::models::AttendanceSignal;
use tally_core::schema::SchemaConfig;

/// Map a status cell's text to its signal.
///
/// Total over all inputs: anything other than the configured present or
/// absent value (late, typos, blank) is [`AttendanceSignal::Unrecognized`].
pub fn score_status(status: &str, schema: &SchemaConfig) -> AttendanceSignal {
    let status = status.trim();
    if status == schema.present_value.trim() {
        AttendanceSignal::Present
    } else if status == schema.absent_value.trim() {
        AttendanceSignal::NotParticipated
    } else {
        AttendanceSignal::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        let schema = SchemaConfig::default();
        assert_eq!(score_status("已签", &schema), AttendanceSignal::Present);
        assert_eq!(
            score_status("未参与", &schema),
            AttendanceSignal::NotParticipated
        );
    }

    #[test]
    fn test_trimming_does_not_change_result() {
        let schema = SchemaConfig::default();
        for raw in ["已签", "未参与", "迟到", ""] {
            let padded = format!(" \t{raw} \n");
            assert_eq!(score_status(raw, &schema), score_status(&padded, &schema));
        }
    }

    #[test]
    fn test_other_values_are_unrecognized() {
        let schema = SchemaConfig::default();
        for raw in ["迟到", "已 签", "缺勤", "", "   ", "1", "已签到"] {
            assert_eq!(
                score_status(raw, &schema),
                AttendanceSignal::Unrecognized,
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_custom_locale_values() {
        let schema = SchemaConfig {
            present_value: "Checked in".to_string(),
            absent_value: "Absent".to_string(),
            ..SchemaConfig::default()
        };
        assert_eq!(score_status(" Checked in", &schema), AttendanceSignal::Present);
        assert_eq!(score_status("Absent", &schema), AttendanceSignal::NotParticipated);
        assert_eq!(score_status("已签", &schema), AttendanceSignal::Unrecognized);
    }
}
