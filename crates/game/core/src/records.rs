//! Record layouts of the DB2 tables shipped with client 5.4.8 (18414).
//!
//! Every struct is `#[repr(C)]` and built only from 4-byte columns (or byte
//! columns in multiples of four), so `size_of::<T>()` equals the size
//! implied by its format string.
use crate::schema::{Record, Schema, StrRef};

/// NPC and creature speech lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct BroadcastTextEntry {
    pub id: u32,
    pub language: u32,
    pub male_text: StrRef,
    pub female_text: StrRef,
    pub emote_id: [u32; 3],
    pub emote_delay: [u32; 3],
    pub sound_id: u32,
    pub end_emote_id: u32,
    pub flags: u32,
}

impl Record for BroadcastTextEntry {
    const SCHEMA: Schema = Schema::new("BroadcastText", "nissiiiiiiiii");

    fn id(&self) -> u32 {
        self.id
    }
}

/// Base item classification.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct ItemEntry {
    pub id: u32,
    pub class: u32,
    pub sub_class: u32,
    pub sound_override_subclass: i32,
    pub material: i32,
    pub display_id: u32,
    pub inventory_type: u32,
    pub sheath: u32,
}

impl Record for ItemEntry {
    const SCHEMA: Schema = Schema::new("Item", "niiiiiii");

    fn id(&self) -> u32 {
        self.id
    }
}

/// Items purchasable with currencies. The leading row id is dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct ItemCurrencyCostEntry {
    pub item_id: u32,
}

impl Record for ItemCurrencyCostEntry {
    const SCHEMA: Schema = Schema::new("ItemCurrencyCost", "xn");

    fn id(&self) -> u32 {
        self.item_id
    }
}

/// Extended item properties (names, stats, requirements).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct ItemSparseEntry {
    pub id: u32,
    pub quality: u32,
    pub flags: [u32; 3],
    pub price_random_value: f32,
    pub price_variance: f32,
    pub buy_count: u32,
    pub buy_price: u32,
    pub sell_price: u32,
    pub inventory_type: u32,
    pub allowable_class: i32,
    pub allowable_race: i32,
    pub item_level: u32,
    pub required_level: i32,
    pub required_skill: u32,
    pub required_skill_rank: u32,
    pub required_spell: u32,
    pub max_count: u32,
    pub stackable: u32,
    pub container_slots: u32,
    pub stat_type: [i32; 10],
    pub stat_value: [i32; 10],
    pub delay: u32,
    pub ranged_mod_range: f32,
    pub bonding: u32,
    pub name: StrRef,
    pub name2: StrRef,
    pub name3: StrRef,
    pub name4: StrRef,
    pub description: StrRef,
    pub page_text: u32,
    pub language_id: u32,
    pub item_set: u32,
    pub max_durability: u32,
    pub area: u32,
    pub map: u32,
    pub socket_color: [u32; 3],
    pub socket_content: [u32; 3],
    pub socket_bonus: u32,
    pub gem_properties: u32,
    pub armor_damage_modifier: f32,
    pub duration: u32,
    pub item_limit_category: u32,
    pub holiday_id: u32,
    pub stat_scaling_factor: f32,
    pub currency_substitution_id: u32,
    pub currency_substitution_count: u32,
}

impl Record for ItemSparseEntry {
    const SCHEMA: Schema = Schema::new(
        "Item-sparse",
        concat!(
            "nii",         // id, quality, flags[0]
            "ii",          // flags[1..3]
            "ff",          // price random value, variance
            "iiii",        // buy count, buy price, sell price, inventory type
            "ii",          // allowable class, race
            "ii",          // item level, required level
            "iii",         // required skill, rank, spell
            "iii",         // max count, stackable, container slots
            "iiiiiiiiii",  // stat type
            "iiiiiiiiii",  // stat value
            "ifi",         // delay, ranged mod, bonding
            "sssss",       // names, description
            "iiiiii",      // page text, language, item set, durability, area, map
            "iii",         // socket color
            "iii",         // socket content
            "ii",          // socket bonus, gem properties
            "f",           // armor damage modifier
            "iii",         // duration, limit category, holiday
            "f",           // stat scaling factor
            "ii",          // currency substitution
        ),
    );

    fn id(&self) -> u32 {
        self.id
    }
}

/// Alternative (non-gold) vendor costs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct ItemExtendedCostEntry {
    pub id: u32,
    pub required_honor_points: u32,
    pub required_arena_points: u32,
    pub required_arena_slot: u32,
    pub required_item: [u32; 5],
    pub required_item_count: [u32; 5],
    pub required_personal_arena_rating: u32,
    pub item_purchase_group: u32,
    pub required_currency: [u32; 5],
    pub required_currency_count: [u32; 5],
    pub required_faction_id: u32,
    pub required_faction_standing: u32,
    pub requirement_flags: u32,
    pub required_guild_level: u32,
    pub required_achievement: u32,
}

impl Record for ItemExtendedCostEntry {
    const SCHEMA: Schema = Schema::new(
        "ItemExtendedCost",
        concat!(
            "niii",  // id, honor, arena points, arena slot
            "iiiii", // required item
            "iiiii", // required item count
            "ii",    // personal rating, purchase group
            "iiiii", // required currency
            "iiiii", // required currency count
            "iiiii", // faction, standing, flags, guild level, achievement
        ),
    );

    fn id(&self) -> u32 {
        self.id
    }
}

/// 32-byte key material for encrypted content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct KeyChainEntry {
    pub id: u32,
    pub key: [u8; 32],
}

impl Record for KeyChainEntry {
    const SCHEMA: Schema = Schema::new(
        "KeyChain",
        concat!("n", "bbbbbbbb", "bbbbbbbb", "bbbbbbbb", "bbbbbbbb"),
    );

    fn id(&self) -> u32 {
        self.id
    }
}

/// Items granted by quest reward packages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct QuestPackageItemEntry {
    pub id: u32,
    pub package_id: u32,
    pub item_id: u32,
    pub count: u32,
    pub flags: u32,
}

impl Record for QuestPackageItemEntry {
    const SCHEMA: Schema = Schema::new("QuestPackageItem", "niiii");

    fn id(&self) -> u32 {
        self.id
    }
}

/// Reagents consumed by a spell cast.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct SpellReagentsEntry {
    pub id: u32,
    pub reagent: [i32; 8],
    pub reagent_count: [u32; 8],
}

impl Record for SpellReagentsEntry {
    const SCHEMA: Schema = Schema::new("SpellReagents", concat!("n", "iiiiiiii", "iiiiiiii"));

    fn id(&self) -> u32 {
        self.id
    }
}
