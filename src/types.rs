use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{LotteryError, Params, Value};

/// Games known to the API, identified on the wire by their slug.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum GameType {
    #[serde(rename = "powerball")]
    Powerball,
    #[serde(rename = "mega-millions")]
    MegaMillions,
    #[serde(rename = "lotto-america")]
    LottoAmerica,
    #[serde(rename = "cash4life")]
    Cash4Life,
    #[serde(rename = "euromillions")]
    EuroMillions,
    #[serde(rename = "eurojackpot")]
    EuroJackpot,
    #[serde(rename = "uk-lotto")]
    UkLotto,
    #[serde(rename = "uk-thunderball")]
    UkThunderball,
}

impl GameType {
    pub const ALL: [GameType; 8] = [
        GameType::Powerball,
        GameType::MegaMillions,
        GameType::LottoAmerica,
        GameType::Cash4Life,
        GameType::EuroMillions,
        GameType::EuroJackpot,
        GameType::UkLotto,
        GameType::UkThunderball,
    ];

    pub fn as_slug(self) -> &'static str {
        match self {
            GameType::Powerball => "powerball",
            GameType::MegaMillions => "mega-millions",
            GameType::LottoAmerica => "lotto-america",
            GameType::Cash4Life => "cash4life",
            GameType::EuroMillions => "euromillions",
            GameType::EuroJackpot => "eurojackpot",
            GameType::UkLotto => "uk-lotto",
            GameType::UkThunderball => "uk-thunderball",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_slug())
    }
}

impl FromStr for GameType {
    type Err = LotteryError;

    fn from_str(slug: &str) -> Result<Self, Self::Err> {
        let slug = slug.trim();
        GameType::ALL
            .into_iter()
            .find(|game| game.as_slug().eq_ignore_ascii_case(slug))
            .ok_or_else(|| LotteryError::Configuration(format!("unknown game type '{slug}'")))
    }
}

/// A completed draw.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    pub game_type: GameType,
    pub draw_date: NaiveDate,
    pub numbers: Vec<u8>,
    #[serde(default)]
    pub bonus_numbers: Vec<u8>,
    #[serde(default)]
    pub multiplier: Option<u32>,
    #[serde(default)]
    pub jackpot: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// One page of historical results.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPage {
    pub results: Vec<DrawResult>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Filters for historical results. Unset fields are not sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl ResultsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub(crate) fn to_params(&self) -> Params {
        Params::new()
            .with("from", self.from)
            .with("to", self.to)
            .with("limit", self.limit)
            .with("page", self.page)
    }
}

/// Ticket numbers to compare against a draw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketCheck {
    pub numbers: Vec<u8>,
    pub bonus_numbers: Vec<u8>,
    /// Draw to check against; the latest draw when unset.
    pub draw_date: Option<NaiveDate>,
}

impl TicketCheck {
    pub fn new(numbers: impl IntoIterator<Item = u8>) -> Self {
        Self {
            numbers: numbers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn bonus_numbers(mut self, bonus_numbers: impl IntoIterator<Item = u8>) -> Self {
        self.bonus_numbers = bonus_numbers.into_iter().collect();
        self
    }

    pub fn draw_date(mut self, draw_date: NaiveDate) -> Self {
        self.draw_date = Some(draw_date);
        self
    }

    pub(crate) fn to_params(&self) -> Params {
        let non_empty =
            |numbers: &[u8]| (!numbers.is_empty()).then(|| Value::list(numbers.iter().copied()));

        Params::new()
            .with("numbers", non_empty(&self.numbers))
            .with("bonusNumbers", non_empty(&self.bonus_numbers))
            .with("drawDate", self.draw_date)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCheckResult {
    pub game_type: GameType,
    pub draw_date: NaiveDate,
    #[serde(default)]
    pub matched_numbers: Vec<u8>,
    #[serde(default)]
    pub matched_bonus_numbers: Vec<u8>,
    #[serde(default)]
    pub is_winner: bool,
    #[serde(default)]
    pub prize_tier: Option<String>,
    #[serde(default)]
    pub prize_amount: Option<f64>,
}

/// A scheduled draw.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDraw {
    pub game_type: GameType,
    pub draw_time: DateTime<Utc>,
    #[serde(default)]
    pub estimated_jackpot: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::{DrawResult, GameType, ResultsQuery, TicketCheck};
    use crate::Value;

    #[test]
    fn slugs_round_trip_through_from_str() {
        for game in GameType::ALL {
            assert_eq!(game.as_slug().parse::<GameType>().expect("known slug"), game);
        }
        assert!("bingo".parse::<GameType>().is_err());
    }

    #[test]
    fn serde_uses_slugs() {
        assert_eq!(
            serde_json::to_value(GameType::MegaMillions).expect("serializable"),
            json!("mega-millions")
        );
    }

    #[test]
    fn draw_result_defaults_optional_fields() {
        let result: DrawResult = serde_json::from_value(json!({
            "gameType": "uk-lotto",
            "drawDate": "2024-05-04",
            "numbers": [3, 11, 19, 27, 38, 52]
        }))
        .expect("minimal draw result");
        assert_eq!(result.game_type, GameType::UkLotto);
        assert!(result.bonus_numbers.is_empty());
        assert_eq!(result.jackpot, None);
    }

    #[test]
    fn results_query_skips_unset_filters() {
        let params = ResultsQuery::new().limit(20).to_params();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("limit"), Some(&Value::Integer(20)));
    }

    #[test]
    fn ticket_check_params() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 6).expect("valid date");
        let params = TicketCheck::new([1, 2, 3, 4, 5]).draw_date(date).to_params();
        assert_eq!(
            params.to_query_pairs(),
            vec![
                ("numbers".to_owned(), "1,2,3,4,5".to_owned()),
                ("drawDate".to_owned(), "2024-01-06".to_owned()),
            ]
        );
    }
}
