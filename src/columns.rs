//! Static catalogue of the tables and columns the gateway may query.
//!
//! Every SQL identifier the gateway emits comes from this module. Request
//! input is only ever matched against the catalogue, never formatted into a
//! query.

use std::fmt;
use std::str::FromStr;

/// A table in the data store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    Trial,
    Antibody,
}

impl Entity {
    /// Physical table name.
    pub const fn table(self) -> &'static str {
        match self {
            Entity::Trial => "trial",
            Entity::Antibody => "antibodies",
        }
    }

    /// Alias used for this table in the search join.
    pub const fn alias(self) -> &'static str {
        match self {
            Entity::Trial => "t",
            Entity::Antibody => "a",
        }
    }
}

/// The closed set of columns accepted by `/unique_values`, `/suggestions`
/// and as `/search` filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    DiseaseIndicationCategory,
    TrialDatapointIdcIdentifierRowIdentifier,
    ImmunogenicityTesting,
    Antibody,
    Target,
}

/// Join key on the trial side, matched against [`Column::Antibody`].
pub const TRIAL_JOIN_KEY: &str = "therapeutic_assessed_for_ada_inn_name";

impl Column {
    pub const ALL: [Column; 5] = [
        Column::DiseaseIndicationCategory,
        Column::TrialDatapointIdcIdentifierRowIdentifier,
        Column::ImmunogenicityTesting,
        Column::Antibody,
        Column::Target,
    ];

    /// Physical column name, identical to the public parameter name.
    pub const fn name(self) -> &'static str {
        match self {
            Column::DiseaseIndicationCategory => "disease_indication_category",
            Column::TrialDatapointIdcIdentifierRowIdentifier => {
                "trial_datapoint_idc_identifier_row_identifier"
            }
            Column::ImmunogenicityTesting => "immunogenicity_testing",
            Column::Antibody => "antibody",
            Column::Target => "target",
        }
    }

    /// The table holding this column.
    pub const fn entity(self) -> Entity {
        match self {
            Column::Antibody | Column::Target => Entity::Antibody,
            Column::DiseaseIndicationCategory
            | Column::TrialDatapointIdcIdentifierRowIdentifier
            | Column::ImmunogenicityTesting => Entity::Trial,
        }
    }

    /// `alias.column`, for use inside the search join.
    pub fn qualified(self) -> String {
        format!("{}.{}", self.entity().alias(), self.name())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumn;

impl FromStr for Column {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|column| column.name() == s)
            .ok_or(UnknownColumn)
    }
}
