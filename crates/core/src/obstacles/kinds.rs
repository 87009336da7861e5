use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    OreCopper,
    OreIron,
    OreGold,
    RockHuge,
    RockHard,
    RockNormal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    CopperOre,
    IronOre,
    GoldOre,
    Stone,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VisualVariant(pub u8);

/// Static behaviour of one obstacle kind. Footprint sizes are in tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindProfile {
    pub hit_points: i32,
    pub footprint_tiles: u8,
    pub variant_count: u8,
    pub drop: Resource,
    pub foot_width: f32,
    pub foot_height: f32,
    asset_stem: &'static str,
}

const ORE_FOOT: f32 = 0.75;

const COPPER: KindProfile = KindProfile {
    hit_points: 2,
    footprint_tiles: 1,
    variant_count: 1,
    drop: Resource::CopperOre,
    foot_width: ORE_FOOT,
    foot_height: ORE_FOOT,
    asset_stem: "ore_copper",
};

const IRON: KindProfile = KindProfile {
    drop: Resource::IronOre,
    asset_stem: "ore_iron",
    ..COPPER
};

const GOLD: KindProfile = KindProfile {
    drop: Resource::GoldOre,
    asset_stem: "ore_gold",
    ..COPPER
};

const HUGE: KindProfile = KindProfile {
    hit_points: 5,
    footprint_tiles: 2,
    variant_count: 1,
    drop: Resource::Stone,
    foot_width: 1.5,
    foot_height: 1.25,
    asset_stem: "rock_huge",
};

const HARD: KindProfile = KindProfile {
    hit_points: 3,
    footprint_tiles: 1,
    variant_count: 3,
    drop: Resource::Stone,
    foot_width: ORE_FOOT,
    foot_height: ORE_FOOT,
    asset_stem: "rock_hard",
};

const NORMAL: KindProfile = KindProfile {
    hit_points: 1,
    variant_count: 5,
    asset_stem: "rock",
    ..HARD
};

impl ObstacleKind {
    pub const ALL: [Self; 6] = [
        Self::OreCopper,
        Self::OreIron,
        Self::OreGold,
        Self::RockHuge,
        Self::RockHard,
        Self::RockNormal,
    ];

    pub fn profile(self) -> &'static KindProfile {
        match self {
            Self::OreCopper => &COPPER,
            Self::OreIron => &IRON,
            Self::OreGold => &GOLD,
            Self::RockHuge => &HUGE,
            Self::RockHard => &HARD,
            Self::RockNormal => &NORMAL,
        }
    }

    pub fn is_ore(self) -> bool {
        matches!(self, Self::OreCopper | Self::OreIron | Self::OreGold)
    }

    pub fn drop(self) -> Resource {
        self.profile().drop
    }

    /// Sprite lookup key, e.g. `mine/rock_hard_2`. Out-of-range variants wrap.
    pub fn asset_key(self, variant: VisualVariant) -> String {
        let profile = self.profile();
        if profile.variant_count <= 1 {
            format!("mine/{}", profile.asset_stem)
        } else {
            format!("mine/{}_{}", profile.asset_stem, variant.0 % profile.variant_count + 1)
        }
    }
}
