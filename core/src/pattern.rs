use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strsim::normalized_damerau_levenshtein;

/// Minimum similarity for a misspelled pattern name to still map to a variant.
const LABEL_MIN_SCORE: f64 = 0.85;

/// Closed vocabulary of parallel-algorithm shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    Map,
    Reduce,
    Scan,
    Stencil,
    Broadcast,
    Gather,
    Scatter,
    Unknown,
}

impl PatternType {
    pub const ALL: [PatternType; 8] = [
        Self::Map,
        Self::Reduce,
        Self::Scan,
        Self::Stencil,
        Self::Broadcast,
        Self::Gather,
        Self::Scatter,
        Self::Unknown,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Reduce => "reduce",
            Self::Scan => "scan",
            Self::Stencil => "stencil",
            Self::Broadcast => "broadcast",
            Self::Gather => "gather",
            Self::Scatter => "scatter",
            Self::Unknown => "unknown",
        }
    }

    /// Capitalized name, e.g. `"Map"`.
    #[must_use]
    pub fn title(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Maps a free-form label from model output onto the vocabulary.
    ///
    /// Case, surrounding whitespace, `-`/space separators and a trailing
    /// "pattern" word are ignored. Close misspellings still resolve; anything
    /// else is `Unknown`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let normalized = label
            .trim()
            .to_lowercase()
            .replace(['-', ' '], "_");
        let normalized = normalized
            .strip_suffix("_pattern")
            .unwrap_or(&normalized)
            .to_string();

        if let Ok(kind) = normalized.parse::<Self>() {
            return kind;
        }

        Self::ALL
            .iter()
            .filter(|k| **k != Self::Unknown)
            .map(|k| (*k, normalized_damerau_levenshtein(&normalized, k.as_str())))
            .filter(|(_, score)| *score >= LABEL_MIN_SCORE)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(Self::Unknown, |(k, _)| k)
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPatternName(pub String);

impl fmt::Display for UnknownPatternName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown pattern name: {}", self.0)
    }
}

impl std::error::Error for UnknownPatternName {}

impl FromStr for PatternType {
    type Err = UnknownPatternName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPatternName(s.to_string()))
    }
}

/// A known pattern with its MPI, OpenMP and standard C++ counterparts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParallelPattern {
    pub kind: PatternType,
    pub description: &'static str,
    pub mpi_equivalent: Option<&'static str>,
    pub openmp_equivalent: Option<&'static str>,
    pub cpp_equivalent: &'static str,
}

const CATALOG: [ParallelPattern; 7] = [
    ParallelPattern {
        kind: PatternType::Map,
        description: "Apply a function to each element independently",
        mpi_equivalent: None,
        openmp_equivalent: Some("#pragma omp parallel for"),
        cpp_equivalent: "std::for_each, std::transform with std::execution::par",
    },
    ParallelPattern {
        kind: PatternType::Reduce,
        description: "Combine elements using a binary operation",
        mpi_equivalent: Some("MPI_Reduce, MPI_Allreduce"),
        openmp_equivalent: Some("#pragma omp parallel for reduction"),
        cpp_equivalent: "std::reduce, std::transform_reduce with std::execution::par",
    },
    ParallelPattern {
        kind: PatternType::Scan,
        description: "Cumulative operation across elements",
        mpi_equivalent: Some("MPI_Scan, MPI_Exscan"),
        openmp_equivalent: Some("#pragma omp parallel for with manual scan"),
        cpp_equivalent: "std::inclusive_scan, std::exclusive_scan with std::execution::par",
    },
    ParallelPattern {
        kind: PatternType::Stencil,
        description: "Update elements based on neighboring values",
        mpi_equivalent: None,
        openmp_equivalent: Some("#pragma omp parallel for with array access patterns"),
        cpp_equivalent: "Custom algorithm with std::execution::par",
    },
    ParallelPattern {
        kind: PatternType::Broadcast,
        description: "Distribute data from one source to all targets",
        mpi_equivalent: Some("MPI_Bcast"),
        openmp_equivalent: None,
        cpp_equivalent: "std::for_each with shared data",
    },
    ParallelPattern {
        kind: PatternType::Gather,
        description: "Collect data from multiple sources to one target",
        mpi_equivalent: Some("MPI_Gather, MPI_Gatherv"),
        openmp_equivalent: None,
        cpp_equivalent: "std::transform_reduce or custom algorithm",
    },
    ParallelPattern {
        kind: PatternType::Scatter,
        description: "Distribute data from one source to multiple targets",
        mpi_equivalent: Some("MPI_Scatter, MPI_Scatterv"),
        openmp_equivalent: None,
        cpp_equivalent: "std::for_each with partitioned data",
    },
];

#[must_use]
pub fn catalog() -> &'static [ParallelPattern] {
    &CATALOG
}

/// Catalog entry for `kind`; `Unknown` has none.
#[must_use]
pub fn lookup(kind: PatternType) -> Option<&'static ParallelPattern> {
    CATALOG.iter().find(|p| p.kind == kind)
}
