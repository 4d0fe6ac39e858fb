//! Built-in shape table.
//!
//! Order matters: matching is first-match-wins, so an entry listed earlier
//! shadows any later entry that would also accept the same expression. The
//! known overlaps are called out inline and pinned by tests in `super`.

use super::{CatalogEntry, Extract};
use crate::condition::ConditionTag::{self, *};

/// Named sub-patterns referenced from the table as `#name`.
pub const HELPERS: &[(&str, &str)] = &[
    ("main", "(ident :Main)"),
    ("npc", "(ident :NPC)"),
    ("my_player", "(index (member #main :player) (member #main :myPlayer))"),
    ("local_player", "{#my_player (member #main :LocalPlayer)}"),
    ("moon_phase", "(member #main :moonPhase)"),
    ("day_time", "(member #main :dayTime)"),
    ("hard_mode", "(member #main :hardMode)"),
    ("number", "{(int _) (float _)}"),
];

const fn entry(tag: ConditionTag, pattern: &'static str) -> CatalogEntry {
    CatalogEntry {
        tag,
        pattern,
        extract: Extract::None,
    }
}

const fn entry_with(tag: ConditionTag, pattern: &'static str, extract: Extract) -> CatalogEntry {
    CatalogEntry {
        tag,
        pattern,
        extract,
    }
}

pub const ENTRIES: &[CatalogEntry] = &[
    // ── Time of day ───────────────────────────────────────────────────────
    entry(TimeDay, "#day_time"),
    // Only reachable through a double negation; a single `!` is stripped
    // before lookup.
    entry(TimeNight, "(not #day_time)"),
    // ── Local player zones ────────────────────────────────────────────────
    entry(InDungeon, "(member #local_player :ZoneDungeon)"),
    entry(InCorrupt, "(member #local_player :ZoneCorrupt)"),
    entry(InHallow, "(member #local_player :ZoneHallow)"),
    entry(InMeteor, "(member #local_player :ZoneMeteor)"),
    entry(InJungle, "(member #local_player :ZoneJungle)"),
    entry(InSnow, "(member #local_player :ZoneSnow)"),
    entry(InCrimson, "(member #local_player :ZoneCrimson)"),
    entry(InWaterCandle, "(member #local_player :ZoneWaterCandle)"),
    entry(InPeaceCandle, "(member #local_player :ZonePeaceCandle)"),
    entry(InTowerSolar, "(member #local_player :ZoneTowerSolar)"),
    entry(InTowerVortex, "(member #local_player :ZoneTowerVortex)"),
    entry(InTowerNebula, "(member #local_player :ZoneTowerNebula)"),
    entry(InTowerStardust, "(member #local_player :ZoneTowerStardust)"),
    entry(InDesert, "(member #local_player :ZoneDesert)"),
    entry(InGlowshroom, "(member #local_player :ZoneGlowshroom)"),
    entry(InUndergroundDesert, "(member #local_player :ZoneUndergroundDesert)"),
    entry(
        InSkyHeight,
        "{(member #local_player :ZoneSkyHeight) \
          (lt (cast _ (paren (div (member (member #my_player :position) :Y) 16.0))) \
              (mul (member #main :worldSurface) 0.35))}",
    ),
    entry(InOverworldHeight, "(member #local_player :ZoneOverworldHeight)"),
    entry(InDirtLayerHeight, "(member #local_player :ZoneDirtLayerHeight)"),
    entry(InRockLayerHeight, "(member #local_player :ZoneRockLayerHeight)"),
    entry(InUnderworldHeight, "(member #local_player :ZoneUnderworldHeight)"),
    entry(InBeach, "(member #local_player :ZoneBeach)"),
    entry(InRain, "(member #local_player :ZoneRain)"),
    entry(InSandstorm, "(member #local_player :ZoneSandstorm)"),
    entry(InOldOnesArmy, "(member #local_player :ZoneOldOneArmy)"),
    entry(InGranite, "(member #local_player :ZoneGranite)"),
    entry(InMarble, "(member #local_player :ZoneMarble)"),
    entry(InHive, "(member #local_player :ZoneHive)"),
    entry(InGemCave, "(member #local_player :ZoneGemCave)"),
    entry(InLihzhardTemple, "(member #local_player :ZoneLihzhardTemple)"),
    entry(InGraveyard, "(member #local_player :ZoneGraveyard)"),
    entry(InAether, "(member #local_player :ZoneShimmer)"),
    entry(InShoppingZoneForest, "(member #local_player :ShoppingZone_Forest)"),
    entry(InBelowSurface, "(member #local_player :ShoppingZone_BelowSurface)"),
    // ── World state ───────────────────────────────────────────────────────
    entry(Hardmode, "#hard_mode"),
    entry(SmashedShadowOrb, "(member (ident :WorldGen) :shadowOrbSmashed)"),
    entry(CrimsonWorld, "(member (ident :WorldGen) :crimson)"),
    entry(DrunkWorld, "(member #main :drunkWorld)"),
    entry(RemixWorld, "(member #main :remixWorld)"),
    entry(NotTheBeesWorld, "(member #main :notTheBeesWorld)"),
    entry(ForTheWorthyWorld, "(member #main :getGoodWorld)"),
    entry(TenthAnniversaryWorld, "(member #main :tenthAnniversaryWorld)"),
    entry(DontStarveWorld, "(member #main :dontStarveWorld)"),
    entry(NoTrapsWorld, "(member #main :noTrapsWorld)"),
    // Whole-expression conjunction: wins over splitting into RemixWorld and
    // ForTheWorthyWorld because the catalog is consulted before decomposing.
    entry(
        ZenithWorld,
        "(and (member #main :remixWorld) (member #main :getGoodWorld))",
    ),
    entry(
        NotZenithWorld,
        "(or (not (member #main :remixWorld)) (not (member #main :getGoodWorld)))",
    ),
    // ── Events ────────────────────────────────────────────────────────────
    entry(Christmas, "(member #main :xMas)"),
    entry(Halloween, "(member #main :halloween)"),
    entry(BloodMoon, "(member #main :bloodMoon)"),
    entry(Eclipse, "(member #main :eclipse)"),
    entry(
        EclipseOrBloodMoon,
        "{(or (member #main :bloodMoon) (member #main :eclipse)) \
          (or (member #main :eclipse) (member #main :bloodMoon))}",
    ),
    // Keyed on the remix/for-the-worthy pair, not on the event flags.
    entry(
        NotEclipseAndNotBloodMoon,
        "(and (not (member #main :remixWorld)) (not (member #main :getGoodWorld)))",
    ),
    entry(Thunderstorm, "(member #main :IsItStorming)"),
    entry(BirthdayParty, "(member (ident :BirthdayParty) :PartyIsUp)"),
    entry(LanternNight, "(member (ident :LanternNight) :LanternsUp)"),
    entry(HappyWindyDay, "(member #main :IsItAHappyWindyDay)"),
    // ── Bosses ────────────────────────────────────────────────────────────
    entry(DownedKingSlime, "(member #npc :downedSlimeKing)"),
    entry(DownedEyeOfCthulhu, "(member #npc :downedBoss1)"),
    entry(DownedEowOrBoc, "(member #npc :downedBoss2)"),
    entry(DownedQueenBee, "(member #npc :downedQueenBee)"),
    entry(DownedSkeletron, "(member #npc :downedBoss3)"),
    entry(DownedDeerclops, "(member #npc :downedDeerclops)"),
    entry(DownedQueenSlime, "(member #npc :downedQueenSlime)"),
    entry(
        DownedEarlygameBoss,
        "(or (or (or (or (member (ident {:Main :NPC}) :downedBoss1) \
                             (member #npc :downedBoss2)) \
                         (member #npc :downedBoss3)) \
                     (member #npc :downedQueenBee)) \
                 #hard_mode)",
    ),
    entry(DownedMechBossAny, "(member #npc :downedMechBossAny)"),
    entry(DownedTwins, "(member #npc :downedMechBoss2)"),
    entry(DownedDestroyer, "(member #npc :downedMechBoss1)"),
    entry(DownedSkeletronPrime, "(member #npc :downedMechBoss3)"),
    entry(
        DownedMechBossAll,
        "(or (or (member (ident {:Main :NPC}) :downedMechBoss1) \
                 (member #npc :downedMechBoss2)) \
             (member #npc :downedMechBoss3))",
    ),
    entry(DownedPlantera, "(member #npc :downedPlantBoss)"),
    entry(DownedEmpressOfLight, "(member #npc :downedEmpressOfLight)"),
    entry(DownedDukeFishron, "(member #npc :downedFishron)"),
    entry(DownedGolem, "(member #npc :downedGolemBoss)"),
    entry(DownedMourningWood, "(member #npc :downedHalloweenTree)"),
    entry(DownedPumpking, "(member #npc :downedHalloweenKing)"),
    entry(DownedEverscream, "(member #npc :downedChristmasTree)"),
    entry(DownedSantaNK1, "(member #npc :downedChristmasSantank)"),
    entry(DownedIceQueen, "(member #npc :downedChristmasIceQueen)"),
    entry(DownedCultist, "(member #npc :downedAncientCultist)"),
    entry(DownedMoonLord, "(member #npc :downedMoonlord)"),
    entry(DownedClown, "(member #npc :downedClown)"),
    entry(DownedGoblinArmy, "(member #npc :downedGoblins)"),
    entry(DownedPirates, "(member #npc :downedPirates)"),
    entry(DownedMartians, "(member #npc :downedMartians)"),
    entry(DownedFrostLegion, "(member #npc :downedFrost)"),
    entry(DownedSolarPillar, "(member #npc :downedTowerSolar)"),
    entry(DownedVortexPillar, "(member #npc :downedTowerVortex)"),
    entry(DownedNebulaPillar, "(member #npc :downedTowerNebula)"),
    entry(DownedStardustPillar, "(member #npc :downedTowerStardust)"),
    // Two unrelated shapes mapped to the same tag.
    entry(BloodMoonOrHardmode, "(or (member #main :bloodMoon) #hard_mode)"),
    entry(
        BloodMoonOrHardmode,
        "(or (not #day_time) (member #main :eclipse))",
    ),
    entry(Multiplayer, "(eq (member #main :netMode) 1)"),
    // ── Moon phases ───────────────────────────────────────────────────────
    entry(MoonPhaseFull, "(eq #moon_phase 0)"),
    entry(MoonPhaseWaningGibbous, "(eq #moon_phase 1)"),
    entry(MoonPhaseThirdQuarter, "(eq #moon_phase 2)"),
    entry(MoonPhaseWaningCrescent, "(eq #moon_phase 3)"),
    entry(MoonPhaseNew, "(eq #moon_phase 4)"),
    entry(MoonPhaseWaxingCrescent, "(eq #moon_phase 5)"),
    entry(MoonPhaseFirstQuarter, "(eq #moon_phase 6)"),
    entry(MoonPhaseWaxingGibbous, "(eq #moon_phase 7)"),
    entry(
        MoonPhasesQuarter0,
        "{(or (eq #moon_phase 0) (eq #moon_phase 1)) \
          (eq (div #moon_phase 2) 0) \
          (le #moon_phase 1)}",
    ),
    entry(
        MoonPhasesQuarter1,
        "{(or (eq #moon_phase 2) (eq #moon_phase 3)) \
          (eq (div #moon_phase 2) 1) \
          (le #moon_phase 3)}",
    ),
    entry(
        MoonPhasesQuarter2,
        "{(or (eq #moon_phase 4) (eq #moon_phase 5)) \
          (eq (div #moon_phase 2) 2) \
          (le #moon_phase 5)}",
    ),
    entry(
        MoonPhasesQuarter3,
        "{(or (eq #moon_phase 6) (eq #moon_phase 7)) \
          (eq (div #moon_phase 2) 3) \
          (le #moon_phase 7)}",
    ),
    entry(
        MoonPhasesHalf0,
        "{(eq (div #moon_phase 4) 0) (lt #moon_phase 4)}",
    ),
    entry(
        MoonPhasesHalf1,
        "{(eq (div #moon_phase 4) 1) (ge #moon_phase 4)}",
    ),
    entry(
        MoonPhasesEven,
        "{(eq (mod #moon_phase 2) 0) \
          (ne (mod #moon_phase 2) 1) \
          (paren (or (or (or (eq #moon_phase 0) (eq #moon_phase 2)) (eq #moon_phase 4)) \
                     (eq #moon_phase 6)))}",
    ),
    entry(
        MoonPhasesOdd,
        "{(ne (mod #moon_phase 2) 0) \
          (eq (mod #moon_phase 2) 1) \
          (paren (or (or (or (eq #moon_phase 1) (eq #moon_phase 3)) (eq #moon_phase 5)) \
                     (eq #moon_phase 7)))}",
    ),
    entry(
        MoonPhasesNearNew,
        "(and (ge #moon_phase 3) (le #moon_phase 5))",
    ),
    entry(
        MoonPhasesEvenQuarters,
        "(or (or (or (eq #moon_phase 0) (eq #moon_phase 1)) (eq #moon_phase 4)) \
             (eq #moon_phase 5))",
    ),
    entry(
        MoonPhasesOddQuarters,
        "(or (or (or (eq #moon_phase 2) (eq #moon_phase 3)) (eq #moon_phase 6)) \
             (eq #moon_phase 7))",
    ),
    entry(MoonPhases04, "(eq (mod #moon_phase 4) 0)"),
    entry(MoonPhases15, "(eq (mod #moon_phase 4) 1)"),
    entry(MoonPhases26, "(eq (mod #moon_phase 4) 2)"),
    entry(MoonPhases37, "(eq (mod #moon_phase 4) 3)"),
    // ── Composites ────────────────────────────────────────────────────────
    entry(
        DownedB2B3HM,
        "(or (or (member #npc :downedBoss2) (member #npc :downedBoss3)) #hard_mode)",
    ),
    entry(
        WorldGenSilver,
        "(eq (member (member (ident :WorldGen) :SavedOreTiers) :Silver) 168)",
    ),
    entry(
        NightAfterEvilOrHardmode,
        "(or (paren (and (member #npc :downedBoss2) (not #day_time))) #hard_mode)",
    ),
    // Wins over splitting into MoonPhasesHalf1 and Hardmode.
    entry(
        MoonPhasesHalf1AndHardmode,
        "(and (ge #moon_phase 4) #hard_mode)",
    ),
    entry(
        HardmodeOrFTW,
        "(or #hard_mode (not (member #main :getGoodWorld)))",
    ),
    entry(
        InBeach2,
        "(and (lt (cast _ (paren (div (member (member #main :screenPosition) :Y) #number))) \
                  (add (member #main :worldSurface) #number)) \
              (paren (or (lt _ #number) \
                         (gt _ (sub (member #main :maxTilesX) #number)))))",
    ),
    entry(
        AtLeastXHealth,
        "(eq (member (member #main :LocalPlayer) :ConsumedLifeCrystals) \
             (member (ident :Player) :LifeCrystalMax))",
    ),
    entry(
        AtLeastXMana,
        "(eq (member (member #main :LocalPlayer) :ConsumedManaCrystals) \
             (member (ident :Player) :ManaCrystalMax))",
    ),
    // Listed before the golf-score shapes: a bare identifier compared
    // against 1000000 is read as a coin count whatever its name.
    entry(PlatinumCoin, "(ge (ident _) 1000000)"),
    entry(
        StyleMoon,
        "(or (paren (and (eq (mod #moon_phase 2) 0) #day_time)) \
             (paren (and (eq (mod #moon_phase 2) 1) (not #day_time))))",
    ),
    entry(OnTeam, "(ne (member #my_player :team) 0)"),
    entry(
        Periodically1,
        "(le (mul (mul (mod (member #main :time) 60.0) 60.0) 6.0) 10800.0)",
    ),
    // ── Parameterised ─────────────────────────────────────────────────────
    entry_with(
        PlayerCarriesItem,
        "(call (member #my_player :HasItem) $(int _))",
        Extract::Int,
    ),
    entry_with(
        PlayerCarriesItem,
        "(or (call (member #my_player :HasItem) $(int _)) \
             (call (member #my_player :HasItem) $(int _)))",
        Extract::IntPair,
    ),
    entry_with(
        GolfScoreOver,
        "(and (lt (ident _) 38) \
              {(gt (ident :golferScoreAccumulated*) $(int _)) \
               (ge (ident :golferScoreAccumulated*) $(int _))})",
        Extract::Int,
    ),
    entry_with(
        GolfScoreOver,
        "{(gt (ident :golferScoreAccumulated*) $(int _)) \
          (ge (ident :golferScoreAccumulated*) $(int _))}",
        Extract::Int,
    ),
    entry_with(
        GolfScoreOver,
        "{(gt (member #local_player :golferScoreAccumulated) $(int _)) \
          (ge (member #local_player :golferScoreAccumulated) $(int _))}",
        Extract::Int,
    ),
    entry_with(
        NpcIsPresent,
        "(call (member #npc :AnyNPCs) $(int _))",
        Extract::Int,
    ),
    entry_with(
        BestiaryFilledPercent,
        "(ge (member (ident :bestiaryProgressReport) :CompletionPercent) $(float _))",
        Extract::Percent,
    ),
];
