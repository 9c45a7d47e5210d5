use bowling_hub::utils::{logger, validation::Validate};
use bowling_hub::{
    CityHubTable, CliConfig, Command, ConfigProvider, ContentApi, HttpContentApi, HubError,
    TomlConfig,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(cli.verbose, logger::LogFormat::from_json_flag(cli.json_logs));

    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => exit_with(&e, 1),
    };

    let hubs = match config.city_hub_table() {
        Ok(hubs) => hubs,
        Err(e) => exit_with(&e, 1),
    };

    tracing::debug!(
        "Using API {} with {:?}",
        config.api_base_url(),
        config.retry_policy()
    );

    run(cli.command, &config, &hubs).await?;
    Ok(())
}

async fn run(command: Command, config: &TomlConfig, hubs: &CityHubTable) -> anyhow::Result<()> {
    match command {
        Command::Hub { city } => match hubs.get_city_hub_url(Some(&city)) {
            Some(path) => println!("{}", path),
            None => {
                eprintln!("❌ No hub page for '{}'", city.trim());
                std::process::exit(2);
            }
        },
        Command::Hubs => {
            for (city, path) in hubs.iter() {
                println!("{:<20} {}", city, path);
            }
        }
        Command::Venues { city } => {
            let api = HttpContentApi::from_config(config)?;
            let venues = api.venues(city.as_deref()).await;
            if venues.is_empty() {
                println!("No venues found");
            }
            for venue in &venues {
                println!(
                    "{}  {} ({}){}",
                    venue.id,
                    venue.name,
                    venue.city,
                    venue
                        .rating
                        .map(|r| format!("  ★ {:.1}", r))
                        .unwrap_or_default()
                );
            }
            if let Some(path) = hubs.get_city_hub_url(city.as_deref()) {
                println!("🎳 More in {}: {}", city.as_deref().unwrap_or_default().trim(), path);
            }
        }
        Command::Venue { id } => {
            let api = HttpContentApi::from_config(config)?;
            let Some(venue) = api.venue(&id).await else {
                eprintln!("❌ Venue '{}' not found", id);
                std::process::exit(2);
            };

            println!("{} - {}", venue.name, venue.city);
            if let Some(address) = &venue.address {
                println!("📍 {}", address);
            }
            if let Some(lanes) = venue.lanes {
                println!("🎳 {} lanes", lanes);
            }
            if let Some(path) = venue.hub_url(hubs) {
                println!("🔗 {}", path);
            }

            for review in api.reviews(&venue.id).await {
                println!(
                    "  [{}/5] {} ({}): {}",
                    review.rating,
                    review.author,
                    review.created_at.format("%Y-%m-%d"),
                    review.body
                );
            }
        }
        Command::Blog { slug: Some(slug) } => {
            let api = HttpContentApi::from_config(config)?;
            match api.blog_post(&slug).await {
                Some(post) => {
                    println!("{}", post.title);
                    if let Some(excerpt) = post.excerpt {
                        println!("{}", excerpt);
                    }
                }
                None => {
                    eprintln!("❌ Blog post '{}' not found", slug);
                    std::process::exit(2);
                }
            }
        }
        Command::Blog { slug: None } => {
            let api = HttpContentApi::from_config(config)?;
            for post in api.blog_posts().await {
                let date = post
                    .published_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "draft".to_string());
                println!("{}  {}  {}", date, post.slug, post.title);
            }
        }
    }

    Ok(())
}

fn exit_with(e: &HubError, code: i32) -> ! {
    tracing::error!("❌ Configuration failed: {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(code);
}
