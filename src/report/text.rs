//! Swedish clinical template texts.
//!
//! These strings are the accredited report wording and are reproduced
//! byte-for-byte from the validated templates, historical spelling included.
//! Do not edit without sign-off from the clinical team.

use crate::classify::CohortClassification;
use crate::error::{CllError, CllResult};
use crate::subset::SubsetDecision;

/// Swedish number words for sequence counts; index 0 is unused.
const SWEDISH_NUMBERS: [&str; 11] = [
    "", "ett", "två", "tre", "fyra", "fem", "sex", "sju", "åtta", "nio", "tio",
];

/// The report wording only covers counts up to ten; larger cohorts fail
/// loudly instead of reusing the wrong word.
pub fn number_word(count: usize) -> CllResult<&'static str> {
    SWEDISH_NUMBERS
        .get(count)
        .copied()
        .filter(|w| !w.is_empty())
        .ok_or(CllError::UnsupportedSequenceCount(count))
}

/// Fixed methodology paragraph opening every report.
pub const METHODOLOGY: &str = "DNA har extraherats från insänt prov och analyserats med massiv parallell sekvensering (MPS, även kallat NGS). Analysen omfattar detektion av klonalt IGHV-D-J genrearrangemang, IGHV-mutationsstatus (muterad, M-CLL eller icke muterad, U-CLL), samt subsettillhörighet (subset #2 eller #8). ";

/// Variant appended when the submission contained no sequences.
pub const ZERO_COUNT: &str = "DNA har extraherats från insänt prov och analyserats med massiv parallell sekvensering (MPS, även kallat NGS). Analysen omfattar detektion av klonalt IGHV-D-J rearrangemang, IGHV-mutationsstatus (muterad, M-CLL eller icke muterad, U-CLL), samt subsettillhörighet (subset #2 eller #8). ";

/// One clonal sequence without a functional rearrangement.
pub const SINGLE_NON_FUNCTIONAL: &str = "Vid analysen finner man en klonal sekvens, men då sekvensen saknar ett funktionellt (produktivt) IGHV-D-J rearrangemang kan IGHV-mutationsstatus inte fastställas. Vi rekommenderar därför att ett nytt blodprov skickas för en utökad analys på RNA-nivå för identifiering av ett klonalt och funktionellt IGHV-D-J rearrangemang där IGHV-mutationsanalys och subset-analys kan utföras. (Provet/RNA skickas till Salgrenska sjukhuset (Göteborg) för analys av RNA). ";

/// One clonal sequence with a functional rearrangement.
pub const SINGLE_FUNCTIONAL: &str = "Vid analysen finner man en klonal sekvens med ett funktionellt (produktivt) IGHV-D-J rearrangemang (se tabell seq1).";

/// Several clonal sequences, all functional.
pub fn multi_functional(word: &str, table_list: &str) -> String {
    format!(
        "Vid analysen finner man {} klonala sekvenser och har funktionella (produktiva) IGHV-D-J rearrangemang. (se tabeller; {}) ",
        word, table_list
    )
}

/// Hypermutation-status paragraph for a cohort.
///
/// `identity_list` is the pre-formatted identity enumeration without its
/// trailing percent sign (e.g. "96.43%, 99.65"). A single-sequence cohort is
/// never inconclusive, so that combination yields the empty string.
pub fn hypermutation_paragraph(
    classification: CohortClassification,
    seq_count: usize,
    identity_list: &str,
) -> CllResult<String> {
    let text = match classification {
        CohortClassification::AllUnmutated => {
            if seq_count == 1 {
                format!(
                    "Analysen påvisar ingen somatisk hypermutation (U-CLL) ({}% identitet mot IGHV-genen).",
                    identity_list
                )
            } else {
                format!(
                    "Analysen av de {} produktiva IGH-gensekvenserna påvisar samstämmig avsaknad av somatisk hypermutation (U-CLL) ({}% identitet mot IGHV-genen).",
                    number_word(seq_count)?,
                    identity_list
                )
            }
        }
        CohortClassification::AllHypermutated => {
            if seq_count == 1 {
                format!(
                    "Analysen påvisar somatisk hypermutation (M-CLL) ({}% identitet mot IGHV-genen)",
                    identity_list
                )
            } else {
                format!(
                    "Analysen av de {} produktiva IGH-gensekvenserna påvisar samstämmig förekomst av somatisk hypermutation (M-CLL) ({}% identitet mot IGHV-genen).",
                    number_word(seq_count)?,
                    identity_list
                )
            }
        }
        CohortClassification::AllBorderline => {
            if seq_count == 1 {
                format!(
                    "Analysen påvisar ett borderline-resultat ({}% identitet mot IGHV-genen).",
                    identity_list
                )
            } else {
                format!(
                    "Analysen av de {} produktiva IGHV-gensekvenserna påvisar ett borderline-resultat ({}% identitet mot IGHV-genen).",
                    number_word(seq_count)?,
                    identity_list
                )
            }
        }
        CohortClassification::Inconclusive => {
            if seq_count > 1 {
                format!(
                    "Analysen av de {} produktiva IGHV-sekvenserna påvisar ett icke-konklusivt resultat av somatisk hypermutation ({}% repektive identitet mot IGHV-genen). Det är således inte möjligt att säkerställa mutationsstatus för aktuellt prov. Vi rekommenderar därför att ett nytt blodprov skickas för en utökad analys på RNA-nivå för identifiering av ett klonalt och funktionellt (produktivt) IGHV-D-J rearrangemang där IGHV-mutationsanalys och subset-analys kan utföras. (Provet skickas till Sahlgrenska sjukhuset (Göteborg) för analys av RNA.)",
                    number_word(seq_count)?,
                    identity_list
                )
            } else {
                String::new()
            }
        }
    };
    Ok(text)
}

/// Subset paragraph for the resolved subset decision.
pub fn subset_paragraph(decision: &SubsetDecision) -> String {
    match decision {
        SubsetDecision::Assigned(label) => {
            format!("Vidare påvisas subsettillhörighet till subset {}", label)
        }
        SubsetDecision::NoAssignment => "Analysen påvisar ingen subsettillhörighet.".to_string(),
        SubsetDecision::Conflicting => "Dessutom visar delmängdsanalysen motsägelsefullt delmängdsmedlemskap med avseende på delmängd #2 eller #8 i det aktuella urvalet. Någon avgörande delmängdstilldelning kan därför inte göras.".to_string(),
    }
}

/// Clinical-guidance sentence keyed on the cohort classification.
///
/// Selected from the typed classification rather than re-parsed from the
/// composed prose; inconclusive cohorts get no guidance.
pub fn guidance_sentence(classification: CohortClassification) -> Option<&'static str> {
    match classification {
        CohortClassification::AllUnmutated | CohortClassification::AllHypermutated => Some(
            "IGHV-mutationsstatus, i detta fall [M-CLL/U-CLL], är en prognostisk (riskstratifierande) markör samt vägleder behandlingsval för KLL (Nationellt Vårdprogram 2024, ERIC Guidelines 2022). ",
        ),
        CohortClassification::AllBorderline => Some(
            "5)\tIGHV-mutationsstatus med borderlinetillhörighet bör beaktas med försiktighet (ERIC Guidelines 2022). ",
        ),
        CohortClassification::Inconclusive => None,
    }
}

/// Prognostic sentence for a uniquely assigned subset.
pub fn subset_prognosis(decision: &SubsetDecision) -> Option<&'static str> {
    match decision.label() {
        Some("#2") => Some(
            "Subset #2 utgör en prognostisk markör som är oberoende av mutationsstatus (Nationellt Vårdprogram 2024, ERIC Guidelines 2022). ",
        ),
        Some("#8") => Some(
            "Subset #8 är en prognostisk markör och har beskrivits vara associerad med en ökad risk att utveckla Richtertransformation (Nationellt Vårdprogram 2024, ERIC Guidelines 2022). ",
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_word_range() {
        assert_eq!(number_word(1).unwrap(), "ett");
        assert_eq!(number_word(10).unwrap(), "tio");
        assert!(matches!(
            number_word(0),
            Err(CllError::UnsupportedSequenceCount(0))
        ));
        assert!(matches!(
            number_word(11),
            Err(CllError::UnsupportedSequenceCount(11))
        ));
    }

    #[test]
    fn test_hypermutation_wording_selection() {
        let single_m =
            hypermutation_paragraph(CohortClassification::AllHypermutated, 1, "96.43").unwrap();
        assert!(single_m.starts_with("Analysen påvisar somatisk hypermutation (M-CLL)"));
        assert!(single_m.contains("(96.43% identitet"));

        let multi_u =
            hypermutation_paragraph(CohortClassification::AllUnmutated, 2, "99.3%, 98.0").unwrap();
        assert!(multi_u.contains("de två produktiva"));
        assert!(multi_u.contains("avsaknad av somatisk hypermutation (U-CLL)"));

        let single_mixed =
            hypermutation_paragraph(CohortClassification::Inconclusive, 1, "97.5").unwrap();
        assert!(single_mixed.is_empty());

        assert!(matches!(
            hypermutation_paragraph(CohortClassification::AllUnmutated, 11, "x"),
            Err(CllError::UnsupportedSequenceCount(11))
        ));
    }

    #[test]
    fn test_guidance_selection() {
        assert!(guidance_sentence(CohortClassification::AllUnmutated)
            .unwrap()
            .contains("[M-CLL/U-CLL]"));
        assert!(guidance_sentence(CohortClassification::AllBorderline)
            .unwrap()
            .contains("borderlinetillhörighet"));
        assert!(guidance_sentence(CohortClassification::Inconclusive).is_none());
    }

    #[test]
    fn test_subset_prognosis_labels() {
        let s2 = SubsetDecision::Assigned("#2".to_string());
        let s8 = SubsetDecision::Assigned("#8".to_string());
        let other = SubsetDecision::Assigned("#4".to_string());
        assert!(subset_prognosis(&s2).unwrap().contains("Subset #2"));
        assert!(subset_prognosis(&s8).unwrap().contains("Richtertransformation"));
        assert!(subset_prognosis(&other).is_none());
        assert!(subset_prognosis(&SubsetDecision::Conflicting).is_none());
    }
}
