// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Census Trend Engine - Type Definitions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Mobile Category ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobileCategory {
    /// Female-citizen-equivalent support unit (gatherers, builders).
    SupportUnit,
    CitizenSoldier,
    Cavalry,
    InfantryMelee,
    InfantryRanged,
    Siege,
}

impl MobileCategory {
    pub const ALL: [Self; 6] = [
        Self::SupportUnit,
        Self::CitizenSoldier,
        Self::Cavalry,
        Self::InfantryMelee,
        Self::InfantryRanged,
        Self::Siege,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SupportUnit => "support_unit",
            Self::CitizenSoldier => "citizen_soldier",
            Self::Cavalry => "cavalry",
            Self::InfantryMelee => "infantry_melee",
            Self::InfantryRanged => "infantry_ranged",
            Self::Siege => "siege",
        }
    }
}

// ─── Static Category ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticCategory {
    House,
    Farmstead,
    Field,
    Barracks,
    CivilCentre,
    Market,
    Temple,
    Storehouse,
    DefenseTower,
}

impl StaticCategory {
    pub const ALL: [Self; 9] = [
        Self::House,
        Self::Farmstead,
        Self::Field,
        Self::Barracks,
        Self::CivilCentre,
        Self::Market,
        Self::Temple,
        Self::Storehouse,
        Self::DefenseTower,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Farmstead => "farmstead",
            Self::Field => "field",
            Self::Barracks => "barracks",
            Self::CivilCentre => "civil_centre",
            Self::Market => "market",
            Self::Temple => "temple",
            Self::Storehouse => "storehouse",
            Self::DefenseTower => "defense_tower",
        }
    }
}

// ─── Category / Group ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    Mobile,
    Static,
}

impl CategoryGroup {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Static => "static",
        }
    }

    /// Every category belonging to this group, in declaration order.
    pub fn categories(&self) -> Vec<Category> {
        match self {
            Self::Mobile => MobileCategory::ALL.iter().map(|&c| Category::Mobile(c)).collect(),
            Self::Static => StaticCategory::ALL.iter().map(|&c| Category::Static(c)).collect(),
        }
    }
}

/// One counted entity type, tagged with the group it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Mobile(MobileCategory),
    Static(StaticCategory),
}

impl Category {
    pub const SUPPORT_UNIT: Self = Self::Mobile(MobileCategory::SupportUnit);

    pub fn group(&self) -> CategoryGroup {
        match self {
            Self::Mobile(_) => CategoryGroup::Mobile,
            Self::Static(_) => CategoryGroup::Static,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mobile(c) => c.name(),
            Self::Static(c) => c.name(),
        }
    }

    /// All fifteen categories, mobile group first.
    pub fn all() -> impl Iterator<Item = Category> {
        MobileCategory::ALL
            .into_iter()
            .map(Category::Mobile)
            .chain(StaticCategory::ALL.into_iter().map(Category::Static))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group().name(), self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category `{0}`")]
pub struct CategoryParseError(pub String);

impl FromStr for Category {
    type Err = CategoryParseError;

    /// Accepts a bare name (`"cavalry"`) or a group-qualified one
    /// (`"static.market"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let found = match s.split_once('.') {
            Some(_) => Category::all().find(|c| c.to_string() == s),
            None => Category::all().find(|c| c.name() == s),
        };
        found.ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

// ─── Per-group records ──────────────────────────────────────────────────────

/// One value per mobile category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileRecord {
    pub support_unit: Decimal,
    pub citizen_soldier: Decimal,
    pub cavalry: Decimal,
    pub infantry_melee: Decimal,
    pub infantry_ranged: Decimal,
    pub siege: Decimal,
}

impl MobileRecord {
    pub fn get(&self, c: MobileCategory) -> Decimal {
        match c {
            MobileCategory::SupportUnit => self.support_unit,
            MobileCategory::CitizenSoldier => self.citizen_soldier,
            MobileCategory::Cavalry => self.cavalry,
            MobileCategory::InfantryMelee => self.infantry_melee,
            MobileCategory::InfantryRanged => self.infantry_ranged,
            MobileCategory::Siege => self.siege,
        }
    }

    pub fn get_mut(&mut self, c: MobileCategory) -> &mut Decimal {
        match c {
            MobileCategory::SupportUnit => &mut self.support_unit,
            MobileCategory::CitizenSoldier => &mut self.citizen_soldier,
            MobileCategory::Cavalry => &mut self.cavalry,
            MobileCategory::InfantryMelee => &mut self.infantry_melee,
            MobileCategory::InfantryRanged => &mut self.infantry_ranged,
            MobileCategory::Siege => &mut self.siege,
        }
    }
}

/// One value per static (structure) category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRecord {
    pub house: Decimal,
    pub farmstead: Decimal,
    pub field: Decimal,
    pub barracks: Decimal,
    pub civil_centre: Decimal,
    pub market: Decimal,
    pub temple: Decimal,
    pub storehouse: Decimal,
    pub defense_tower: Decimal,
}

impl StaticRecord {
    pub fn get(&self, c: StaticCategory) -> Decimal {
        match c {
            StaticCategory::House => self.house,
            StaticCategory::Farmstead => self.farmstead,
            StaticCategory::Field => self.field,
            StaticCategory::Barracks => self.barracks,
            StaticCategory::CivilCentre => self.civil_centre,
            StaticCategory::Market => self.market,
            StaticCategory::Temple => self.temple,
            StaticCategory::Storehouse => self.storehouse,
            StaticCategory::DefenseTower => self.defense_tower,
        }
    }

    pub fn get_mut(&mut self, c: StaticCategory) -> &mut Decimal {
        match c {
            StaticCategory::House => &mut self.house,
            StaticCategory::Farmstead => &mut self.farmstead,
            StaticCategory::Field => &mut self.field,
            StaticCategory::Barracks => &mut self.barracks,
            StaticCategory::CivilCentre => &mut self.civil_centre,
            StaticCategory::Market => &mut self.market,
            StaticCategory::Temple => &mut self.temple,
            StaticCategory::Storehouse => &mut self.storehouse,
            StaticCategory::DefenseTower => &mut self.defense_tower,
        }
    }
}

// ─── CategoryRecord ─────────────────────────────────────────────────────────

/// A value for every category in both groups.
///
/// Shared shape of samples, priority weights, differences and summaries, so
/// the key set is always exactly the closed enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub mobile: MobileRecord,
    pub structures: StaticRecord,
}

impl CategoryRecord {
    pub fn get(&self, category: Category) -> Decimal {
        match category {
            Category::Mobile(c) => self.mobile.get(c),
            Category::Static(c) => self.structures.get(c),
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Decimal {
        match category {
            Category::Mobile(c) => self.mobile.get_mut(c),
            Category::Static(c) => self.structures.get_mut(c),
        }
    }

    pub fn set(&mut self, category: Category, value: Decimal) {
        *self.get_mut(category) = value;
    }

    /// Build a record by evaluating `f` for every category.
    pub fn from_fn(mut f: impl FnMut(Category) -> Decimal) -> Self {
        let mut record = Self::default();
        for category in Category::all() {
            record.set(category, f(category));
        }
        record
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Decimal)> + '_ {
        Category::all().map(move |c| (c, self.get(c)))
    }
}

// ─── Sample ─────────────────────────────────────────────────────────────────

/// One census snapshot across both category groups.
///
/// `cycle` is the collector cycle that produced it (0 for hand-built samples).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub cycle: u64,
    pub counts: CategoryRecord,
}

impl Sample {
    pub fn new(cycle: u64) -> Self {
        Self { cycle, counts: CategoryRecord::default() }
    }

    pub fn count(&self, category: Category) -> Decimal {
        self.counts.get(category)
    }

    pub fn set_count(&mut self, category: Category, count: Decimal) {
        self.counts.set(category, count);
    }

    /// Builder-style setter, mostly for tests and scripted hosts.
    pub fn with(mut self, category: Category, count: Decimal) -> Self {
        self.set_count(category, count);
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
