use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::matrix::PairwiseMatrix;

/// Code of a top-level category such as `U1`: ASCII letters followed by digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryCode(String);

impl CategoryCode {
    pub fn parse(raw: &str) -> Result<Self, HierarchyError> {
        match category_prefix(raw) {
            Some(prefix) if prefix.len() == raw.len() => Ok(Self(raw.to_string())),
            _ => Err(HierarchyError::InvalidCategoryCode(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CategoryCode {
    type Error = HierarchyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CategoryCode> for String {
    fn from(code: CategoryCode) -> Self {
        code.0
    }
}

/// Leaf criterion identifier: category code, leaf letter, and 1-based index (`U1A3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LeafId(String);

impl LeafId {
    pub fn new(category: &CategoryCode, letter: char, index: usize) -> Self {
        Self(format!("{category}{letter}{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Leading `<letters><digits>` group of a criterion key, if it has one.
///
/// `"U3C5"` resolves to `"U3"`; `"U"` and `"7A"` have no category prefix.
pub fn category_prefix(key: &str) -> Option<&str> {
    let letters = key
        .bytes()
        .take_while(|byte| byte.is_ascii_alphabetic())
        .count();
    if letters == 0 {
        return None;
    }

    let digits = key[letters..]
        .bytes()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }

    Some(&key[..letters + digits])
}

/// One top-level category and the matrix comparing its leaf criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub code: CategoryCode,
    pub label: String,
    pub leaf_letter: char,
    pub leaves: Vec<String>,
    pub matrix: PairwiseMatrix,
}

impl CategoryDefinition {
    pub fn leaf_ids(&self) -> Vec<LeafId> {
        (1..=self.leaves.len())
            .map(|index| LeafId::new(&self.code, self.leaf_letter, index))
            .collect()
    }
}

/// Source of the top-level category weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TopLevelWeights {
    /// Predefined weight per category code.
    Fixed { weights: BTreeMap<CategoryCode, f64> },
    /// Weights normalized from a matrix ordered like the category list.
    Derived { matrix: PairwiseMatrix },
}

/// Complete two-level criterion hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyDefinition {
    pub name: String,
    pub categories: Vec<CategoryDefinition>,
    pub top_level: TopLevelWeights,
}

impl HierarchyDefinition {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DefinitionLoadError> {
        let definition = serde_json::from_reader(reader)?;
        Ok(definition)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DefinitionLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn category(&self, code: &str) -> Option<&CategoryDefinition> {
        self.categories
            .iter()
            .find(|category| category.code.as_str() == code)
    }

    /// Structural checks. Matrix consistency is judged separately by the engine.
    pub fn validate(&self) -> Result<(), HierarchyError> {
        if self.categories.is_empty() {
            return Err(HierarchyError::NoCategories);
        }

        let mut seen = BTreeSet::new();
        for category in &self.categories {
            if !seen.insert(category.code.clone()) {
                return Err(HierarchyError::DuplicateCategory(category.code.clone()));
            }
            if !category.leaf_letter.is_ascii_alphabetic() {
                return Err(HierarchyError::InvalidLeafLetter {
                    category: category.code.clone(),
                    letter: category.leaf_letter,
                });
            }
            if category.leaves.len() != category.matrix.order() {
                return Err(HierarchyError::LeafCountMismatch {
                    category: category.code.clone(),
                    leaves: category.leaves.len(),
                    order: category.matrix.order(),
                });
            }
        }

        match &self.top_level {
            TopLevelWeights::Fixed { weights } => {
                for category in &self.categories {
                    match weights.get(&category.code) {
                        None => return Err(HierarchyError::MissingWeight(category.code.clone())),
                        Some(value) if !value.is_finite() || *value < 0.0 => {
                            return Err(HierarchyError::InvalidWeight {
                                category: category.code.clone(),
                                value: *value,
                            })
                        }
                        Some(_) => {}
                    }
                }
                if let Some(extra) = weights.keys().find(|code| !seen.contains(*code)) {
                    return Err(HierarchyError::UnknownWeight(extra.clone()));
                }
            }
            TopLevelWeights::Derived { matrix } => {
                if matrix.order() != self.categories.len() {
                    return Err(HierarchyError::TopLevelOrderMismatch {
                        categories: self.categories.len(),
                        order: matrix.order(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Farmer loan hierarchy: family background, willingness to repay, ability
    /// to repay, and relationship with the cooperative.
    pub fn farmer_credit() -> Self {
        let categories = vec![
            standard_category(
                "U1",
                "Family background",
                'A',
                &[
                    "Age range",
                    "Household members engaged in labor",
                    "Property and identity verification",
                    "Marital and family support status",
                    "Approach to personal finances",
                    "Family health condition",
                    "Farming experience and skills",
                ],
                vec![
                    vec![1.0, 3.0, 5.0, 7.0, 2.0, 4.0, 6.0],
                    vec![1.0 / 3.0, 1.0, 3.0, 5.0, 2.0, 3.0, 4.0],
                    vec![1.0 / 5.0, 1.0 / 3.0, 1.0, 3.0, 1.0, 2.0, 3.0],
                    vec![1.0 / 7.0, 1.0 / 5.0, 1.0 / 3.0, 1.0, 0.5, 1.0, 2.0],
                    vec![0.5, 0.5, 1.0, 2.0, 1.0, 2.0, 3.0],
                    vec![0.25, 1.0 / 3.0, 0.5, 1.0, 0.5, 1.0, 2.0],
                    vec![1.0 / 6.0, 0.25, 1.0 / 3.0, 0.5, 1.0 / 3.0, 0.5, 1.0],
                ],
            ),
            standard_category(
                "U2",
                "Willingness to repay",
                'B',
                &[
                    "Loan repayment history",
                    "Timeliness of past installments",
                    "Communication with the lender",
                    "Commitment to repayment plan",
                ],
                vec![
                    vec![1.0, 4.0, 7.0, 5.0],
                    vec![0.25, 1.0, 3.0, 2.0],
                    vec![1.0 / 7.0, 1.0 / 3.0, 1.0, 0.5],
                    vec![0.2, 0.5, 2.0, 1.0],
                ],
            ),
            standard_category(
                "U3",
                "Ability to repay",
                'C',
                &[
                    "Household income level",
                    "Income stability",
                    "Farm productivity",
                    "Savings",
                    "Existing debt burden",
                    "Collateral",
                    "Off-farm income",
                ],
                vec![
                    vec![1.0, 3.0, 5.0, 7.0, 4.0, 6.0, 8.0],
                    vec![1.0 / 3.0, 1.0, 3.0, 5.0, 3.0, 4.0, 6.0],
                    vec![0.2, 1.0 / 3.0, 1.0, 3.0, 2.0, 3.0, 4.0],
                    vec![1.0 / 7.0, 0.2, 1.0 / 3.0, 1.0, 0.5, 2.0, 3.0],
                    vec![0.25, 1.0 / 3.0, 0.5, 2.0, 1.0, 3.0, 4.0],
                    vec![1.0 / 6.0, 0.25, 1.0 / 3.0, 0.5, 1.0 / 3.0, 1.0, 2.0],
                    vec![0.125, 1.0 / 6.0, 0.25, 1.0 / 3.0, 0.25, 0.5, 1.0],
                ],
            ),
            standard_category(
                "U4",
                "Relationship with the cooperative",
                'D',
                &[
                    "Cooperative membership",
                    "Participation in association activities",
                    "Standing with association leadership",
                ],
                vec![
                    vec![1.0, 2.0, 4.0],
                    vec![0.5, 1.0, 3.0],
                    vec![0.25, 1.0 / 3.0, 1.0],
                ],
            ),
        ];

        let weights = [("U1", 0.0954), ("U2", 0.1601), ("U3", 0.2772), ("U4", 0.4673)]
            .into_iter()
            .map(|(code, weight)| (CategoryCode(code.to_string()), weight))
            .collect();

        Self {
            name: "farmer-credit".to_string(),
            categories,
            top_level: TopLevelWeights::Fixed { weights },
        }
    }
}

fn standard_category(
    code: &str,
    label: &str,
    leaf_letter: char,
    leaves: &[&str],
    rows: Vec<Vec<f64>>,
) -> CategoryDefinition {
    CategoryDefinition {
        code: CategoryCode(code.to_string()),
        label: label.to_string(),
        leaf_letter,
        leaves: leaves.iter().map(|leaf| leaf.to_string()).collect(),
        matrix: PairwiseMatrix::new(rows).expect("built-in matrices are reciprocal"),
    }
}

/// Structural problems in a hierarchy definition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HierarchyError {
    #[error("hierarchy must define at least one category")]
    NoCategories,
    #[error("category code '{0}' must be letters followed by digits, e.g. U1")]
    InvalidCategoryCode(String),
    #[error("category {0} is defined more than once")]
    DuplicateCategory(CategoryCode),
    #[error("category {category} uses '{letter}' as leaf letter; expected an ASCII letter")]
    InvalidLeafLetter { category: CategoryCode, letter: char },
    #[error("category {category} lists {leaves} leaves but its matrix has order {order}")]
    LeafCountMismatch {
        category: CategoryCode,
        leaves: usize,
        order: usize,
    },
    #[error("no top-level weight given for category {0}")]
    MissingWeight(CategoryCode),
    #[error("top-level weight for category {category} must be finite and non-negative, found {value}")]
    InvalidWeight { category: CategoryCode, value: f64 },
    #[error("top-level weight given for undefined category {0}")]
    UnknownWeight(CategoryCode),
    #[error("top-level matrix has order {order} but the hierarchy defines {categories} categories")]
    TopLevelOrderMismatch { categories: usize, order: usize },
}

#[derive(Debug)]
pub enum DefinitionLoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for DefinitionLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionLoadError::Io(err) => {
                write!(f, "failed to read hierarchy definition: {}", err)
            }
            DefinitionLoadError::Json(err) => {
                write!(f, "invalid hierarchy definition: {}", err)
            }
        }
    }
}

impl std::error::Error for DefinitionLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DefinitionLoadError::Io(err) => Some(err),
            DefinitionLoadError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DefinitionLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for DefinitionLoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
