use crate::pattern::PatternType;
use once_cell::sync::Lazy;
use regex::Regex;

static STENCIL_INDEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\s*i\s*[+-]\s*\d+\s*\]").unwrap());

const OMP_PARALLEL_FOR: &str = "#pragma omp parallel for";

/// Substring rules checked in order; the first hit for a kind fixes its position.
const MPI_RULES: &[(&[&str], PatternType)] = &[
    (&["MPI_Reduce", "MPI_Allreduce"], PatternType::Reduce),
    (&["MPI_Scan", "MPI_Exscan"], PatternType::Scan),
    (&["MPI_Bcast"], PatternType::Broadcast),
    (&["MPI_Gather"], PatternType::Gather),
    (&["MPI_Scatter"], PatternType::Scatter),
];

/// Heuristic classification of MPI/OpenMP source.
///
/// Blank input yields no patterns; input with no recognizable construct
/// yields `[Unknown]`. Each kind appears at most once.
#[must_use]
pub fn identify_patterns(code: &str) -> Vec<PatternType> {
    if code.trim().is_empty() {
        return Vec::new();
    }

    let mut found: Vec<PatternType> = Vec::new();
    let mut push = |kind: PatternType| {
        if !found.contains(&kind) {
            found.push(kind);
        }
    };

    if code.contains(OMP_PARALLEL_FOR) {
        if code.contains("reduction") {
            push(PatternType::Reduce);
        } else {
            push(PatternType::Map);
        }
    }

    for (needles, kind) in MPI_RULES {
        if needles.iter().any(|n| code.contains(*n)) {
            push(*kind);
        }
    }

    if STENCIL_INDEX_RE.is_match(code) {
        push(PatternType::Stencil);
    }

    if found.is_empty() {
        found.push(PatternType::Unknown);
    }
    found
}
