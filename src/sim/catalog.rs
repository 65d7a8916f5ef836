//! Static content tables: abilities, relics, synergy pairs, enemy archetypes
//!
//! Catalog entries are never mutated at runtime. Relic modifiers are resolved
//! at the point of use through [`RelicSet`].

use serde::{Deserialize, Serialize};

/// Ability tags (shown in drafts, grouped for UI hints)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityTag {
    Elemental,
    Fire,
    Ice,
    Shock,
    Wind,
    Defense,
    Support,
    Void,
    Radiant,
    Toxic,
    Earth,
    Control,
    Mobility,
}

/// Player abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    Firebolt,
    IceShard,
    Lightning,
    WindSlash,
    Shield,
    Heal,
    VoidNova,
    RadiantArc,
    PoisonDart,
    Quake,
    Blink,
}

/// Static ability definition
#[derive(Debug)]
pub struct AbilityDef {
    pub kind: AbilityKind,
    pub name: &'static str,
    /// Base cooldown in seconds
    pub cooldown: f32,
    pub tags: &'static [AbilityTag],
}

use AbilityTag as T;

static ABILITIES: [AbilityDef; 11] = [
    AbilityDef { kind: AbilityKind::Firebolt, name: "Firebolt", cooldown: 2.0, tags: &[T::Elemental, T::Fire] },
    AbilityDef { kind: AbilityKind::IceShard, name: "IceShard", cooldown: 2.5, tags: &[T::Elemental, T::Ice] },
    AbilityDef { kind: AbilityKind::Lightning, name: "Lightning", cooldown: 3.0, tags: &[T::Elemental, T::Shock] },
    AbilityDef { kind: AbilityKind::WindSlash, name: "WindSlash", cooldown: 1.2, tags: &[T::Elemental, T::Wind] },
    AbilityDef { kind: AbilityKind::Shield, name: "Shield", cooldown: 6.0, tags: &[T::Defense] },
    AbilityDef { kind: AbilityKind::Heal, name: "Heal", cooldown: 6.0, tags: &[T::Support] },
    AbilityDef { kind: AbilityKind::VoidNova, name: "VoidNova", cooldown: 5.0, tags: &[T::Void] },
    AbilityDef { kind: AbilityKind::RadiantArc, name: "RadiantArc", cooldown: 4.0, tags: &[T::Radiant] },
    AbilityDef { kind: AbilityKind::PoisonDart, name: "PoisonDart", cooldown: 1.6, tags: &[T::Toxic] },
    AbilityDef { kind: AbilityKind::Quake, name: "Quake", cooldown: 4.5, tags: &[T::Earth, T::Control] },
    AbilityDef { kind: AbilityKind::Blink, name: "Blink", cooldown: 3.5, tags: &[T::Mobility] },
];

impl AbilityKind {
    pub const ALL: [AbilityKind; 11] = [
        AbilityKind::Firebolt,
        AbilityKind::IceShard,
        AbilityKind::Lightning,
        AbilityKind::WindSlash,
        AbilityKind::Shield,
        AbilityKind::Heal,
        AbilityKind::VoidNova,
        AbilityKind::RadiantArc,
        AbilityKind::PoisonDart,
        AbilityKind::Quake,
        AbilityKind::Blink,
    ];

    /// Loadout at the start of every run
    pub const STARTERS: [AbilityKind; 3] =
        [AbilityKind::Firebolt, AbilityKind::IceShard, AbilityKind::Shield];

    pub fn def(self) -> &'static AbilityDef {
        &ABILITIES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }
}

/// Named synergy buffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynergyKind {
    Firestorm,
    ShatterShock,
    Aegis,
    Eclipse,
    VenomRend,
    Thunderquake,
    Frostquake,
    PhaseGuard,
    StormWalk,
    VoidStorm,
    Hellfire,
    VoidTornado,
    LifeSpark,
    PrismIce,
    Fortress,
}

/// One row of the synergy pair table
#[derive(Debug)]
pub struct SynergyDef {
    pub kind: SynergyKind,
    pub name: &'static str,
    pub desc: &'static str,
    pub pair: (AbilityKind, AbilityKind),
}

use AbilityKind as A;

static SYNERGIES: [SynergyDef; 15] = [
    SynergyDef { kind: SynergyKind::Firestorm, name: "Firestorm", desc: "Fire spells create burning winds", pair: (A::Firebolt, A::WindSlash) },
    SynergyDef { kind: SynergyKind::ShatterShock, name: "ShatterShock", desc: "Lightning shatters frozen enemies", pair: (A::IceShard, A::Lightning) },
    SynergyDef { kind: SynergyKind::Aegis, name: "Aegis", desc: "Perfect defense regeneration", pair: (A::Shield, A::Heal) },
    SynergyDef { kind: SynergyKind::Eclipse, name: "Eclipse", desc: "Shadow and light become one", pair: (A::VoidNova, A::RadiantArc) },
    SynergyDef { kind: SynergyKind::VenomRend, name: "VenomRend", desc: "Poison spreads through air", pair: (A::PoisonDart, A::WindSlash) },
    SynergyDef { kind: SynergyKind::Thunderquake, name: "Thunderquake", desc: "Earth splits with electric fury", pair: (A::Quake, A::Lightning) },
    SynergyDef { kind: SynergyKind::Frostquake, name: "Frostquake", desc: "Frozen ground shatters", pair: (A::IceShard, A::Quake) },
    SynergyDef { kind: SynergyKind::PhaseGuard, name: "PhaseGuard", desc: "Untouchable movement", pair: (A::Blink, A::Shield) },
    SynergyDef { kind: SynergyKind::StormWalk, name: "StormWalk", desc: "Lightning trail follows blinks", pair: (A::Blink, A::Lightning) },
    SynergyDef { kind: SynergyKind::VoidStorm, name: "VoidStorm", desc: "Chaotic energy chains", pair: (A::Lightning, A::VoidNova) },
    SynergyDef { kind: SynergyKind::Hellfire, name: "Hellfire", desc: "Toxic flames burn longer", pair: (A::Firebolt, A::PoisonDart) },
    SynergyDef { kind: SynergyKind::VoidTornado, name: "VoidTornado", desc: "Reality tears in spirals", pair: (A::WindSlash, A::VoidNova) },
    SynergyDef { kind: SynergyKind::LifeSpark, name: "LifeSpark", desc: "Healing energy electrifies", pair: (A::Heal, A::Lightning) },
    SynergyDef { kind: SynergyKind::PrismIce, name: "PrismIce", desc: "Light refracts through ice", pair: (A::RadiantArc, A::IceShard) },
    SynergyDef { kind: SynergyKind::Fortress, name: "Fortress", desc: "Immovable defender", pair: (A::Shield, A::Quake) },
];

impl SynergyKind {
    pub fn def(self) -> &'static SynergyDef {
        &SYNERGIES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }
}

/// Look up the synergy for an unordered ability pair
pub fn synergy_for(a: AbilityKind, b: AbilityKind) -> Option<SynergyKind> {
    if a == b {
        return None;
    }
    SYNERGIES
        .iter()
        .find(|s| s.pair == (a, b) || s.pair == (b, a))
        .map(|s| s.kind)
}

/// Relic rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// Which draft pool a relic belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelicPool {
    /// Offered on regular relic drafts
    Standard,
    /// Only offered after a boss is defeated
    Legendary,
}

/// Permanent relics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelicKind {
    FocusingCore,
    FleetBoots,
    HeartSigil,
    Sharper,
    Grounded,
    CinderBloom,
    PhaseGuard,
    SynergyMaster,
    GlassCannon,
    VampiricTouch,
    EchoChamber,
    BerserkerRage,
    ShieldBattery,
}

/// Passive modifier carried by a relic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelicModifier {
    /// Multiplies ability cooldowns
    pub cooldown_scalar: f32,
    /// Restricts `cooldown_scalar` to one ability
    pub cooldown_only: Option<AbilityKind>,
    /// Multiplies player move speed
    pub speed_scalar: f32,
    /// Flat bonus added to base ability damage
    pub damage_bonus: i32,
    /// Multiplies synergy window and duration
    pub effect_duration_scalar: f32,
}

impl RelicModifier {
    pub const NONE: RelicModifier = RelicModifier {
        cooldown_scalar: 1.0,
        cooldown_only: None,
        speed_scalar: 1.0,
        damage_bonus: 0,
        effect_duration_scalar: 1.0,
    };
}

/// Static relic definition
#[derive(Debug)]
pub struct RelicDef {
    pub kind: RelicKind,
    pub name: &'static str,
    pub desc: &'static str,
    pub rarity: Rarity,
    pub pool: RelicPool,
    pub modifier: RelicModifier,
}

const M: RelicModifier = RelicModifier::NONE;

static RELICS: [RelicDef; 13] = [
    RelicDef { kind: RelicKind::FocusingCore, name: "Focusing Core", desc: "-15% ability cooldowns", rarity: Rarity::Common, pool: RelicPool::Standard, modifier: RelicModifier { cooldown_scalar: 0.85, ..M } },
    RelicDef { kind: RelicKind::FleetBoots, name: "Fleet Boots", desc: "+15% move speed", rarity: Rarity::Common, pool: RelicPool::Standard, modifier: RelicModifier { speed_scalar: 1.15, ..M } },
    RelicDef { kind: RelicKind::HeartSigil, name: "Heart Sigil", desc: "+2 max HP & heal 2", rarity: Rarity::Common, pool: RelicPool::Standard, modifier: M },
    RelicDef { kind: RelicKind::Sharper, name: "Sharper", desc: "+1 ability damage", rarity: Rarity::Uncommon, pool: RelicPool::Standard, modifier: RelicModifier { damage_bonus: 1, ..M } },
    RelicDef { kind: RelicKind::Grounded, name: "Grounded", desc: "Quake also stuns briefly", rarity: Rarity::Uncommon, pool: RelicPool::Standard, modifier: M },
    RelicDef { kind: RelicKind::CinderBloom, name: "Cinder Bloom", desc: "Fire explosions +25% radius", rarity: Rarity::Uncommon, pool: RelicPool::Standard, modifier: M },
    RelicDef { kind: RelicKind::PhaseGuard, name: "PhaseGuard", desc: "Shield grants longer i-frames", rarity: Rarity::Rare, pool: RelicPool::Standard, modifier: M },
    RelicDef { kind: RelicKind::SynergyMaster, name: "Synergy Master", desc: "Synergies last longer", rarity: Rarity::Rare, pool: RelicPool::Standard, modifier: RelicModifier { effect_duration_scalar: 1.6, ..M } },
    RelicDef { kind: RelicKind::GlassCannon, name: "Glass Cannon", desc: "+2 damage, -2 max HP", rarity: Rarity::Rare, pool: RelicPool::Legendary, modifier: RelicModifier { damage_bonus: 2, ..M } },
    RelicDef { kind: RelicKind::VampiricTouch, name: "Vampiric Touch", desc: "Heal 1 HP every 10 kills", rarity: Rarity::Uncommon, pool: RelicPool::Legendary, modifier: M },
    RelicDef { kind: RelicKind::EchoChamber, name: "Echo Chamber", desc: "10% chance to double cast", rarity: Rarity::Legendary, pool: RelicPool::Legendary, modifier: M },
    RelicDef { kind: RelicKind::BerserkerRage, name: "Berserker Rage", desc: "+50% damage bonus when below 3 HP", rarity: Rarity::Uncommon, pool: RelicPool::Legendary, modifier: M },
    RelicDef { kind: RelicKind::ShieldBattery, name: "Shield Battery", desc: "Shield cooldown -50%", rarity: Rarity::Uncommon, pool: RelicPool::Legendary, modifier: RelicModifier { cooldown_scalar: 0.5, cooldown_only: Some(AbilityKind::Shield), ..M } },
];

impl RelicKind {
    pub const ALL: [RelicKind; 13] = [
        RelicKind::FocusingCore,
        RelicKind::FleetBoots,
        RelicKind::HeartSigil,
        RelicKind::Sharper,
        RelicKind::Grounded,
        RelicKind::CinderBloom,
        RelicKind::PhaseGuard,
        RelicKind::SynergyMaster,
        RelicKind::GlassCannon,
        RelicKind::VampiricTouch,
        RelicKind::EchoChamber,
        RelicKind::BerserkerRage,
        RelicKind::ShieldBattery,
    ];

    pub fn def(self) -> &'static RelicDef {
        &RELICS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }
}

/// Player health at or below which Berserker Rage kicks in
pub const BERSERKER_HP_THRESHOLD: i32 = 3;

/// Relics owned this run, in acquisition order
#[derive(Debug, Clone, Default)]
pub struct RelicSet {
    owned: Vec<RelicKind>,
}

impl RelicSet {
    pub fn has(&self, kind: RelicKind) -> bool {
        self.owned.contains(&kind)
    }

    /// Add a relic; returns false if it was already owned
    pub fn insert(&mut self, kind: RelicKind) -> bool {
        if self.has(kind) {
            return false;
        }
        self.owned.push(kind);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = RelicKind> + '_ {
        self.owned.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    fn modifiers(&self) -> impl Iterator<Item = &'static RelicModifier> + '_ {
        self.owned.iter().map(|k| &k.def().modifier)
    }

    /// Combined cooldown multiplier for one ability
    pub fn cooldown_scalar(&self, ability: AbilityKind) -> f32 {
        self.modifiers()
            .filter(|m| m.cooldown_only.is_none_or(|only| only == ability))
            .map(|m| m.cooldown_scalar)
            .product()
    }

    pub fn speed_scalar(&self) -> f32 {
        self.modifiers().map(|m| m.speed_scalar).product()
    }

    pub fn effect_duration_scalar(&self) -> f32 {
        self.modifiers().map(|m| m.effect_duration_scalar).product()
    }

    /// Flat damage bonus, boosted by Berserker Rage at low health
    pub fn damage_bonus(&self, player_hp: i32) -> i32 {
        let bonus: i32 = self.modifiers().map(|m| m.damage_bonus).sum();
        if self.has(RelicKind::BerserkerRage) && player_hp <= BERSERKER_HP_THRESHOLD {
            (bonus as f32 * 1.5).floor() as i32
        } else {
            bonus
        }
    }
}

/// Enemy archetypes (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Grunt,
    Archer,
    Bomber,
    Dasher,
    OrbitMage,
    Splitter,
    Tank,
    Sniper,
    Minion,
    Phantom,
    Healer,
    Shielder,
    Trickster,
    Voidling,
    Warden,
    EclipseTwin,
    VoidMonarch,
}

/// Base stats for an archetype
#[derive(Debug)]
pub struct ArchetypeParams {
    pub name: &'static str,
    pub base_hp: i32,
    /// hp += room * num / den
    pub hp_per_room: (i32, i32),
    /// Pixels per second
    pub base_speed: f32,
    pub speed_per_room: f32,
    pub radius: f32,
}

static ARCHETYPES: [ArchetypeParams; 17] = [
    ArchetypeParams { name: "Grunt", base_hp: 2, hp_per_room: (1, 2), base_speed: 33.0, speed_per_room: 3.0, radius: 4.0 },
    ArchetypeParams { name: "Archer", base_hp: 2, hp_per_room: (1, 3), base_speed: 27.0, speed_per_room: 0.0, radius: 4.0 },
    ArchetypeParams { name: "Bomber", base_hp: 3, hp_per_room: (1, 2), base_speed: 30.0, speed_per_room: 0.0, radius: 4.0 },
    ArchetypeParams { name: "Dasher", base_hp: 3, hp_per_room: (1, 3), base_speed: 18.0, speed_per_room: 0.0, radius: 4.0 },
    ArchetypeParams { name: "Orbit Mage", base_hp: 4, hp_per_room: (1, 3), base_speed: 24.0, speed_per_room: 0.0, radius: 4.0 },
    ArchetypeParams { name: "Splitter", base_hp: 5, hp_per_room: (1, 2), base_speed: 27.0, speed_per_room: 0.0, radius: 5.0 },
    ArchetypeParams { name: "Tank", base_hp: 8, hp_per_room: (1, 1), base_speed: 15.0, speed_per_room: 0.0, radius: 6.0 },
    ArchetypeParams { name: "Sniper", base_hp: 3, hp_per_room: (1, 2), base_speed: 21.0, speed_per_room: 0.0, radius: 4.0 },
    ArchetypeParams { name: "Minion", base_hp: 1, hp_per_room: (0, 1), base_speed: 42.0, speed_per_room: 0.0, radius: 3.0 },
    ArchetypeParams { name: "Phantom", base_hp: 4, hp_per_room: (1, 3), base_speed: 36.0, speed_per_room: 0.0, radius: 4.0 },
    ArchetypeParams { name: "Healer", base_hp: 3, hp_per_room: (1, 3), base_speed: 24.0, speed_per_room: 0.0, radius: 4.0 },
    ArchetypeParams { name: "Shielder", base_hp: 5, hp_per_room: (1, 2), base_speed: 18.0, speed_per_room: 0.0, radius: 5.0 },
    ArchetypeParams { name: "Trickster", base_hp: 3, hp_per_room: (1, 3), base_speed: 42.0, speed_per_room: 0.0, radius: 4.0 },
    ArchetypeParams { name: "Voidling", base_hp: 2, hp_per_room: (1, 3), base_speed: 0.0, speed_per_room: 0.0, radius: 3.0 },
    ArchetypeParams { name: "The Warden", base_hp: 30, hp_per_room: (4, 1), base_speed: 36.0, speed_per_room: 0.0, radius: 7.0 },
    ArchetypeParams { name: "Eclipse Twin", base_hp: 30, hp_per_room: (4, 1), base_speed: 36.0, speed_per_room: 0.0, radius: 7.0 },
    ArchetypeParams { name: "Void Monarch", base_hp: 50, hp_per_room: (6, 1), base_speed: 24.0, speed_per_room: 0.0, radius: 8.0 },
];

impl EnemyKind {
    pub const BOSSES: [EnemyKind; 3] =
        [EnemyKind::Warden, EnemyKind::EclipseTwin, EnemyKind::VoidMonarch];

    pub fn params(self) -> &'static ArchetypeParams {
        &ARCHETYPES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.params().name
    }

    pub fn is_boss(self) -> bool {
        matches!(
            self,
            EnemyKind::Warden | EnemyKind::EclipseTwin | EnemyKind::VoidMonarch
        )
    }

    /// Max hp for this archetype in the given room
    pub fn hp_for_room(self, room: u32) -> i32 {
        let p = self.params();
        let (num, den) = p.hp_per_room;
        p.base_hp + room as i32 * num / den
    }

    /// Move speed (px/s) for this archetype in the given room
    pub fn speed_for_room(self, room: u32) -> f32 {
        let p = self.params();
        p.base_speed + p.speed_per_room * room as f32
    }
}
