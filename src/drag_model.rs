use std::str::FromStr;

/// Standard drag table family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragModel {
    G1,
    G7,
}

impl DragModel {
    /// File name of the table resource for this model (`g1.txt`, `g7.txt`)
    pub fn file_name(&self) -> &'static str {
        match self {
            DragModel::G1 => "g1.txt",
            DragModel::G7 => "g7.txt",
        }
    }
}

impl FromStr for DragModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "G1" => Ok(DragModel::G1),
            "G7" => Ok(DragModel::G7),
            other => Err(format!("unknown drag model '{other}' (expected G1 or G7)")),
        }
    }
}

impl std::fmt::Display for DragModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
