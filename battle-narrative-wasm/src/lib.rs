//! WASM bindings for battle-narrative: drives the battle replay in the web client.

use wasm_bindgen::prelude::*;

use battle_narrative::core::template::TemplatePool;
use battle_narrative::{
    BattleEngine, BattleError, BattleOutcome, BattleSession, KartConfig, RoundNarrative, Side,
};

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------

/// Ids and seeds arrive from the chain either as strings or as numbers.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

#[derive(serde::Deserialize)]
struct OutcomeInput {
    home_id: Scalar,
    away_id: Scalar,
    winner: u8,
    seed: Scalar,
    #[serde(default)]
    prize: Option<String>,
}

#[derive(serde::Deserialize)]
struct KartInput {
    title: String,
    #[serde(default)]
    config: KartConfig,
}

#[derive(serde::Serialize)]
struct RoundView<'a> {
    index: usize,
    aggressor: u8,
    score: u32,
    weapon: &'a str,
    shield: Option<&'a str>,
    totals: [u32; 2],
    power: [u32; 2],
    lines: &'a [String],
    last: bool,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------
fn parse_outcome(json: &str) -> Result<BattleOutcome, BattleError> {
    let input: OutcomeInput = serde_json::from_str(json)
        .map_err(|e| BattleError::InvalidOutcome(format!("outcome JSON: {e}")))?;
    let winner = Side::from_index(input.winner).ok_or_else(|| {
        BattleError::InvalidOutcome(format!("winner must be 0 or 1, got {}", input.winner))
    })?;
    let mut outcome = BattleOutcome::new(
        input.home_id.into_string(),
        input.away_id.into_string(),
        winner,
        input.seed.into_string(),
    );
    outcome.prize = input.prize;
    Ok(outcome)
}

fn parse_karts(json: &str) -> Result<[KartInput; 2], BattleError> {
    serde_json::from_str(json).map_err(|e| BattleError::InvalidOutcome(format!("kart JSON: {e}")))
}

fn round_view(narrative: &RoundNarrative, index: usize, total: usize, starting_power: u32) -> RoundView<'_> {
    let round = &narrative.round;
    RoundView {
        index,
        aggressor: round.aggressor.into(),
        score: round.score,
        weapon: round.weapon.as_str(),
        shield: round.shield.as_ref().map(|s| s.as_str()),
        totals: round.running_totals,
        power: round.remaining_power(starting_power),
        lines: &narrative.lines,
        last: index + 1 == total,
    }
}

fn js_error(e: BattleError) -> JsError {
    JsError::new(&e.to_string())
}

// ---------------------------------------------------------------------------
// WasmBattle: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct WasmBattle {
    engine: BattleEngine,
    session: Option<BattleSession>,
}

#[wasm_bindgen]
impl WasmBattle {
    /// Create an engine from the built-in battle text, optionally merged
    /// with a RON override (e.g. a translation).
    #[wasm_bindgen(constructor)]
    pub fn new(templates_ron: Option<String>) -> Result<WasmBattle, JsError> {
        let mut pool = TemplatePool::builtin().map_err(|e| js_error(e.into()))?;
        if let Some(src) = templates_ron {
            let overrides = TemplatePool::parse_ron(&src).map_err(|e| js_error(e.into()))?;
            pool.merge(overrides);
        }
        let engine = BattleEngine::builder()
            .with_templates(pool)
            .build()
            .map_err(js_error)?;
        Ok(WasmBattle {
            engine,
            session: None,
        })
    }

    /// Generate the narrative for a decided battle.
    ///
    /// Expected JSON shapes:
    /// ```json
    /// { "home_id": "12", "away_id": "40", "winner": 1, "seed": 83811 }
    /// [
    ///   { "title": "A NEAR Kart Called Zippy",
    ///     "config": { "left": "WeaponLaser", "right": "ShieldKevlar", "front": "WeaponEmpty" } },
    ///   { "title": "A NEAR Kart Called Dent", "config": { "left": "WeaponAxe" } }
    /// ]
    /// ```
    pub fn load(&mut self, outcome_json: &str, karts_json: &str) -> Result<(), JsError> {
        let outcome = parse_outcome(outcome_json).map_err(js_error)?;
        let [home, away] = parse_karts(karts_json).map_err(js_error)?;
        let session = self
            .engine
            .load_from_configs(
                &outcome,
                [home.title.as_str(), away.title.as_str()],
                &[home.config, away.config],
            )
            .map_err(js_error)?;
        self.session = Some(session);
        Ok(())
    }

    /// The next round as JSON, or `null` once the battle has been shown.
    pub fn next(&mut self) -> Result<Option<String>, JsError> {
        let starting_power = self.engine.rules().starting_power;
        let Some(session) = self.session.as_mut() else {
            return Err(JsError::new("no battle loaded"));
        };
        let index = session.cursor();
        let total = session.len();
        match session.next() {
            Some(narrative) => {
                let view = round_view(narrative, index, total, starting_power);
                serde_json::to_string(&view)
                    .map(Some)
                    .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
            }
            None => Ok(None),
        }
    }

    /// Replay the loaded battle from the first round.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reset();
        }
    }

    /// Skip to the end of the battle.
    pub fn end(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.end();
        }
    }

    pub fn finished(&self) -> bool {
        self.session.as_ref().map_or(true, BattleSession::is_finished)
    }

    pub fn round_count(&self) -> usize {
        self.session.as_ref().map_or(0, BattleSession::len)
    }

    pub fn winner_name(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.winner_name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_seeds_agree() {
        let a = parse_outcome(r#"{"home_id": 1, "away_id": 2, "winner": 0, "seed": 5150}"#).unwrap();
        let b = parse_outcome(r#"{"home_id": "1", "away_id": "2", "winner": 0, "seed": "5150"}"#)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bad_winner_is_an_invalid_outcome() {
        let err = parse_outcome(r#"{"home_id": 1, "away_id": 2, "winner": 3, "seed": 1}"#)
            .unwrap_err();
        assert!(matches!(err, BattleError::InvalidOutcome(_)));
    }

    #[test]
    fn karts_need_exactly_two_entries() {
        assert!(parse_karts(r#"[{"title": "A NEAR Kart Called Zippy"}]"#).is_err());
        let [home, away] = parse_karts(
            r#"[{"title": "Zippy", "config": {"left": "WeaponLaser"}}, {"title": "Dent"}]"#,
        )
        .unwrap();
        assert_eq!(home.config.left.as_deref(), Some("WeaponLaser"));
        assert_eq!(away.config, KartConfig::default());
    }

    #[test]
    fn round_view_marks_the_last_round() {
        let engine = BattleEngine::builder().build().unwrap();
        let outcome = parse_outcome(r#"{"home_id": 1, "away_id": 2, "winner": 1, "seed": 9}"#).unwrap();
        let session = engine
            .load_from_configs(&outcome, ["Zippy", "Dent"], &[KartConfig::default(), KartConfig::default()])
            .unwrap();
        let total = session.len();
        let last = round_view(&session.rounds()[total - 1], total - 1, total, 100);
        assert!(last.last);
        assert_eq!(last.aggressor, 1);
        assert_eq!(last.power[0], 100u32.saturating_sub(last.totals[1]));
    }
}
