use lotterydata_http::{GameType, LotteryClient, ResultsQuery};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = LotteryClient::from_env()?;

    for game in [GameType::Powerball, GameType::MegaMillions] {
        let latest = client.latest_result(game).await?;
        println!(
            "{game} {}: {:?} + {:?}",
            latest.draw_date, latest.numbers, latest.bonus_numbers
        );
    }

    let history = client
        .results(GameType::EuroMillions, &ResultsQuery::new().limit(5))
        .await?;
    for draw in history.results {
        println!("euromillions {}: {:?}", draw.draw_date, draw.numbers);
    }

    for draw in client.upcoming_draws().await? {
        println!("next {} draw at {}", draw.game_type, draw.draw_time);
    }

    Ok(())
}
