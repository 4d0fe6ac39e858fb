//! Condition catalog: an ordered table of expression shapes, each mapped to
//! a condition tag and an optional parameter extractor.

pub mod entries;

use std::sync::LazyLock;

use crate::condition::{Condition, ConditionTag, InvertError};
use crate::pattern::{Captured, Pattern};
use crate::syntax::{Expr, UnaryOp};

/// How a matched shape's captures turn into condition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    None,
    /// First capture is an int literal.
    Int,
    /// First two captures are int literals.
    IntPair,
    /// First capture is a float fraction; `>= 1` becomes `BestiaryFull`.
    Percent,
}

#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub tag: ConditionTag,
    pub pattern: &'static str,
    pub extract: Extract,
}

impl CatalogEntry {
    fn build(&self, captures: &[Captured<'_>]) -> Option<Condition> {
        let int_at = |i: usize| captures.get(i)?.as_node()?.as_int();
        match self.extract {
            Extract::None => Some(Condition::new(self.tag)),
            Extract::Int => Some(Condition::with_param(self.tag, int_at(0)?)),
            Extract::IntPair => Some(Condition::with_params(self.tag, int_at(0)?, int_at(1)?)),
            Extract::Percent => {
                let Some(Expr::Float { value }) = captures.first()?.as_node() else {
                    return None;
                };
                let percent = *value as f32;
                if percent < 1.0 {
                    Some(Condition::with_param(
                        ConditionTag::BestiaryFilledPercent,
                        (percent * 100.0) as i64,
                    ))
                } else {
                    Some(Condition::new(ConditionTag::BestiaryFull))
                }
            }
        }
    }
}

/// Compiled, ordered shape table. Lookup is first-match-wins.
pub struct Catalog {
    entries: Vec<(CatalogEntry, Pattern)>,
}

static BUILTIN: LazyLock<Catalog> =
    LazyLock::new(|| Catalog::compile(entries::ENTRIES, entries::HELPERS));

impl Catalog {
    /// Compile a table. Entries whose pattern fails to compile are logged
    /// and left out.
    pub fn compile(table: &[CatalogEntry], helpers: &[(&str, &str)]) -> Self {
        let mut compiled = Vec::with_capacity(table.len());
        for entry in table {
            match Pattern::compile_with(entry.pattern, helpers) {
                Ok(pattern) => compiled.push((*entry, pattern)),
                Err(e) => log::error!("skipping catalog entry for {}: {e}", entry.tag),
            }
        }
        Self { entries: compiled }
    }

    /// The built-in catalog, compiled on first use.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn entries(&self) -> impl Iterator<Item = (&CatalogEntry, &Pattern)> {
        self.entries.iter().map(|(entry, pattern)| (entry, pattern))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose shape accepts `expr` as written.
    pub fn lookup(&self, expr: &Expr) -> Option<Condition> {
        self.entries.iter().find_map(|(entry, pattern)| {
            let captures = pattern.matches(expr)?;
            entry.build(&captures)
        })
    }

    /// Match a guard expression.
    ///
    /// A leading `!` is peeled off (along with any parentheses under it),
    /// the operand is looked up, and the result is inverted. `Ok(None)`
    /// means no shape matched; an `Err` means a shape matched but its tag
    /// could not be inverted, in which case the match is discarded.
    pub fn match_expr(&self, expr: &Expr) -> Result<Option<Condition>, InvertError> {
        let (target, negated) = match expr {
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => (operand.strip_parens(), true),
            _ => (expr, false),
        };

        let Some(condition) = self.lookup(target) else {
            return Ok(None);
        };
        if negated {
            condition.invert().map(Some)
        } else {
            Ok(Some(condition))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionTag::*;
    use crate::syntax::parse_expr;

    fn matched(src: &str) -> Option<Condition> {
        let expr = parse_expr(src).unwrap();
        Catalog::builtin().match_expr(&expr).unwrap()
    }

    fn tag_of(src: &str) -> Option<ConditionTag> {
        matched(src).map(|c| c.tag)
    }

    #[test]
    fn every_builtin_entry_compiles() {
        assert_eq!(Catalog::builtin().len(), entries::ENTRIES.len());
        for entry in entries::ENTRIES {
            if let Err(e) = Pattern::compile_with(entry.pattern, entries::HELPERS) {
                panic!("{}: {e}", entry.tag);
            }
        }
    }

    #[test]
    fn zone_flags_accept_both_player_forms() {
        assert_eq!(tag_of("Main.player[Main.myPlayer].ZoneSnow"), Some(InSnow));
        assert_eq!(tag_of("Main.LocalPlayer.ZoneSnow"), Some(InSnow));
        assert_eq!(tag_of("Main.LocalPlayer.ZoneShimmer"), Some(InAether));
        assert_eq!(
            tag_of("Main.LocalPlayer.ShoppingZone_BelowSurface"),
            Some(InBelowSurface)
        );
        assert_eq!(tag_of("Main.player[0].ZoneSnow"), None);
        assert_eq!(tag_of("player.ZoneSnow"), None);
    }

    #[test]
    fn sky_height_arithmetic_form() {
        let src = "(double)(Main.player[Main.myPlayer].position.Y / 16f) < Main.worldSurface * 0.35000000149011612";
        assert_eq!(tag_of(src), Some(InSkyHeight));
        let src = "(double)(Main.player[Main.myPlayer].position.Y / 16f) < Main.worldSurface * 0.35";
        assert_eq!(tag_of(src), Some(InSkyHeight));
        assert_eq!(tag_of("Main.LocalPlayer.ZoneSkyHeight"), Some(InSkyHeight));
    }

    #[test]
    fn world_and_event_flags() {
        assert_eq!(tag_of("Main.hardMode"), Some(Hardmode));
        assert_eq!(tag_of("WorldGen.crimson"), Some(CrimsonWorld));
        assert_eq!(tag_of("WorldGen.shadowOrbSmashed"), Some(SmashedShadowOrb));
        assert_eq!(tag_of("Main.getGoodWorld"), Some(ForTheWorthyWorld));
        assert_eq!(tag_of("Main.xMas"), Some(Christmas));
        assert_eq!(tag_of("BirthdayParty.PartyIsUp"), Some(BirthdayParty));
        assert_eq!(tag_of("Main.netMode == 1"), Some(Multiplayer));
        assert_eq!(tag_of("Main.netMode == 2"), None);
    }

    #[test]
    fn negation_inverts() {
        assert_eq!(tag_of("!Main.dayTime"), Some(TimeNight));
        assert_eq!(tag_of("!Main.hardMode"), Some(PreHardmode));
        assert_eq!(tag_of("!(Main.hardMode)"), Some(PreHardmode));
        assert_eq!(tag_of("!((WorldGen.crimson))"), Some(CorruptWorld));
        assert_eq!(tag_of("!NPC.downedPlantBoss"), Some(NotDownedPlantera));
        assert_eq!(tag_of("!Main.LocalPlayer.ZoneHallow"), Some(NotInHallowBiome));
        assert_eq!(tag_of("!(Main.remixWorld && Main.getGoodWorld)"), Some(NotZenithWorld));
    }

    #[test]
    fn double_negation_reaches_the_night_shape() {
        assert_eq!(tag_of("!!Main.dayTime"), Some(TimeDay));
    }

    #[test]
    fn negation_without_complement_is_an_error() {
        let expr = parse_expr("!Main.LocalPlayer.ZoneSnow").unwrap();
        assert_eq!(
            Catalog::builtin().match_expr(&expr),
            Err(InvertError::NoComplement(InSnow))
        );
    }

    #[test]
    fn parenthesised_negation_is_not_peeled() {
        // The negation is only peeled at the top of the guard.
        assert_eq!(tag_of("(!Main.hardMode)"), None);
    }

    #[test]
    fn catalogued_or_shapes() {
        assert_eq!(tag_of("Main.bloodMoon || Main.eclipse"), Some(EclipseOrBloodMoon));
        assert_eq!(tag_of("Main.eclipse || Main.bloodMoon"), Some(EclipseOrBloodMoon));
        assert_eq!(
            tag_of("!Main.remixWorld || !Main.getGoodWorld"),
            Some(NotZenithWorld)
        );
        assert_eq!(tag_of("Main.hardMode || !Main.getGoodWorld"), Some(HardmodeOrFTW));
        assert_eq!(
            tag_of("NPC.downedBoss2 || NPC.downedBoss3 || Main.hardMode"),
            Some(DownedB2B3HM)
        );
        assert_eq!(
            tag_of("(NPC.downedBoss2 && !Main.dayTime) || Main.hardMode"),
            Some(NightAfterEvilOrHardmode)
        );
        assert_eq!(tag_of("Main.hardMode || Main.bloodMoon"), None);
    }

    #[test]
    fn blood_moon_or_hardmode_synonyms() {
        assert_eq!(tag_of("Main.bloodMoon || Main.hardMode"), Some(BloodMoonOrHardmode));
        assert_eq!(tag_of("!Main.dayTime || Main.eclipse"), Some(BloodMoonOrHardmode));
    }

    #[test]
    fn boss_chains_accept_either_owner_on_the_first_operand() {
        let early = "Main.downedBoss1 || NPC.downedBoss2 || NPC.downedBoss3 || NPC.downedQueenBee || Main.hardMode";
        assert_eq!(tag_of(early), Some(DownedEarlygameBoss));
        let early = "NPC.downedBoss1 || NPC.downedBoss2 || NPC.downedBoss3 || NPC.downedQueenBee || Main.hardMode";
        assert_eq!(tag_of(early), Some(DownedEarlygameBoss));
        assert_eq!(
            tag_of("NPC.downedMechBoss1 || NPC.downedMechBoss2 || NPC.downedMechBoss3"),
            Some(DownedMechBossAll)
        );
        assert_eq!(
            tag_of("!(Main.downedMechBoss1 || NPC.downedMechBoss2 || NPC.downedMechBoss3)"),
            Some(NotDownedMechBossAll)
        );
        assert_eq!(tag_of("NPC.downedMechBoss1"), Some(DownedDestroyer));
        assert_eq!(tag_of("NPC.downedMechBoss2"), Some(DownedTwins));
    }

    #[test]
    fn moon_phase_shapes() {
        assert_eq!(tag_of("Main.moonPhase == 0"), Some(MoonPhaseFull));
        assert_eq!(tag_of("Main.moonPhase == 7"), Some(MoonPhaseWaxingGibbous));
        assert_eq!(tag_of("Main.moonPhase == 8"), None);
        assert_eq!(tag_of("Main.moonPhase / 2 == 1"), Some(MoonPhasesQuarter1));
        assert_eq!(tag_of("Main.moonPhase == 4 || Main.moonPhase == 5"), Some(MoonPhasesQuarter2));
        assert_eq!(tag_of("Main.moonPhase <= 1"), Some(MoonPhasesQuarter0));
        assert_eq!(tag_of("Main.moonPhase < 4"), Some(MoonPhasesHalf0));
        assert_eq!(tag_of("Main.moonPhase >= 4"), Some(MoonPhasesHalf1));
        assert_eq!(tag_of("!(Main.moonPhase / 4 == 0)"), Some(MoonPhasesHalf1));
        assert_eq!(tag_of("Main.moonPhase % 2 == 0"), Some(MoonPhasesEven));
        assert_eq!(tag_of("Main.moonPhase % 2 != 0"), Some(MoonPhasesOdd));
        assert_eq!(
            tag_of("(Main.moonPhase == 1 || Main.moonPhase == 3 || Main.moonPhase == 5 || Main.moonPhase == 7)"),
            Some(MoonPhasesOdd)
        );
        assert_eq!(
            tag_of("Main.moonPhase >= 3 && Main.moonPhase <= 5"),
            Some(MoonPhasesNearNew)
        );
        assert_eq!(
            tag_of("Main.moonPhase == 0 || Main.moonPhase == 1 || Main.moonPhase == 4 || Main.moonPhase == 5"),
            Some(MoonPhasesEvenQuarters)
        );
        assert_eq!(tag_of("Main.moonPhase % 4 == 2"), Some(MoonPhases26));
    }

    #[test]
    fn whole_conjunctions_win_over_their_parts() {
        assert_eq!(tag_of("Main.remixWorld && Main.getGoodWorld"), Some(ZenithWorld));
        assert_eq!(
            tag_of("!Main.remixWorld && !Main.getGoodWorld"),
            Some(NotEclipseAndNotBloodMoon)
        );
        assert_eq!(
            tag_of("Main.moonPhase >= 4 && Main.hardMode"),
            Some(MoonPhasesHalf1AndHardmode)
        );
    }

    #[test]
    fn composite_shapes() {
        assert_eq!(tag_of("WorldGen.SavedOreTiers.Silver == 168"), Some(WorldGenSilver));
        assert_eq!(tag_of("WorldGen.SavedOreTiers.Silver != 168"), None);
        assert_eq!(tag_of("!(WorldGen.SavedOreTiers.Silver == 168)"), Some(WorldGenTungsten));
        assert_eq!(
            tag_of("Main.LocalPlayer.ConsumedLifeCrystals == Player.LifeCrystalMax"),
            Some(AtLeastXHealth)
        );
        assert_eq!(
            tag_of("Main.LocalPlayer.ConsumedManaCrystals == Player.ManaCrystalMax"),
            Some(AtLeastXMana)
        );
        assert_eq!(tag_of("num3 >= 1000000"), Some(PlatinumCoin));
        assert_eq!(tag_of("Main.player[Main.myPlayer].team != 0"), Some(OnTeam));
        assert_eq!(
            tag_of("Main.time % 60.0 * 60.0 * 6.0 <= 10800.0"),
            Some(Periodically1)
        );
        assert_eq!(
            tag_of("!(Main.time % 60.0 * 60.0 * 6.0 <= 10800.0)"),
            Some(Periodically2)
        );
        assert_eq!(
            tag_of("(Main.moonPhase % 2 == 0 && Main.dayTime) || (Main.moonPhase % 2 == 1 && !Main.dayTime)"),
            Some(StyleMoon)
        );
    }

    #[test]
    fn beach_arithmetic_form() {
        let src = "(double)(Main.screenPosition.Y / 16f) < Main.worldSurface + 10.0 \
                   && (num < 380 || num > Main.maxTilesX - 380)";
        assert_eq!(tag_of(src), Some(InBeach2));
    }

    #[test]
    fn has_item_params() {
        assert_eq!(
            matched("Main.player[Main.myPlayer].HasItem(3000)"),
            Some(Condition::with_param(PlayerCarriesItem, 3000))
        );
        assert_eq!(
            matched("Main.player[Main.myPlayer].HasItem(3000) || Main.player[Main.myPlayer].HasItem(3001)"),
            Some(Condition::with_params(PlayerCarriesItem, 3000, 3001))
        );
        assert_eq!(matched("Main.player[Main.myPlayer].HasItem(id)"), None);
    }

    #[test]
    fn golf_score_shapes() {
        let expected = Some(Condition::with_param(GolfScoreOver, 500));
        assert_eq!(matched("num < 38 && golferScoreAccumulated > 500"), expected);
        assert_eq!(matched("golferScoreAccumulated2 >= 500"), expected);
        assert_eq!(matched("Main.LocalPlayer.golferScoreAccumulated >= 500"), expected);
        assert_eq!(
            matched("Main.player[Main.myPlayer].golferScoreAccumulated > 500"),
            expected
        );
        assert_eq!(matched("golfScore >= 500"), None);
    }

    #[test]
    fn coin_threshold_shadows_golf_score() {
        assert_eq!(tag_of("golferScoreAccumulated >= 1000000"), Some(PlatinumCoin));
    }

    #[test]
    fn npc_presence() {
        assert_eq!(
            matched("NPC.AnyNPCs(208)"),
            Some(Condition::with_param(NpcIsPresent, 208))
        );
    }

    #[test]
    fn bestiary_percent_and_full() {
        assert_eq!(
            matched("bestiaryProgressReport.CompletionPercent >= 0.35f"),
            Some(Condition::with_param(BestiaryFilledPercent, 35))
        );
        assert_eq!(
            matched("bestiaryProgressReport.CompletionPercent >= 0.1f"),
            Some(Condition::with_param(BestiaryFilledPercent, 10))
        );
        assert_eq!(
            matched("bestiaryProgressReport.CompletionPercent >= 1f"),
            Some(Condition::new(BestiaryFull))
        );
    }

    #[test]
    fn failed_compile_is_skipped() {
        let table = [
            CatalogEntry {
                tag: Hardmode,
                pattern: "(member #missing :hardMode)",
                extract: Extract::None,
            },
            CatalogEntry {
                tag: Hardmode,
                pattern: "(member (ident :Main) :hardMode)",
                extract: Extract::None,
            },
        ];
        let catalog = Catalog::compile(&table, &[]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.lookup(&parse_expr("Main.hardMode").unwrap()),
            Some(Condition::new(Hardmode))
        );
    }

    #[test]
    fn first_entry_wins() {
        let table = [
            CatalogEntry {
                tag: Hardmode,
                pattern: "(member _ :flag)",
                extract: Extract::None,
            },
            CatalogEntry {
                tag: Christmas,
                pattern: "(member (ident :Main) :flag)",
                extract: Extract::None,
            },
        ];
        let catalog = Catalog::compile(&table, &[]);
        assert_eq!(
            catalog.lookup(&parse_expr("Main.flag").unwrap()).map(|c| c.tag),
            Some(Hardmode)
        );
    }
}
