use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Parser;
use std::sync::Arc;
use swap_desk::{
    aggregator::{AggregatorClient, SwapAggregator},
    cli::{Cli, Command, PairArgs},
    config::AppConfig,
    models::SwapStatus,
    quote::{QuotePoller, QuoteState, format_compact},
    search::resolve_token,
    showcase::{review, summation},
    swap::{SwapForm, create_order, execute::submit_signed},
    utils::{self, PingLevel},
    wallet::short_address,
};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();
    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::debug!(jupiter_url = %config.jupiter_url, "[INIT] configuration loaded");

    match cli.command {
        Command::Search { query, limit } => search(&config, &query, limit).await,
        Command::Quote { pair, taker } => quote(&config, &pair, taker.as_deref()).await,
        Command::Watch { pair } => watch_quote(&config, &pair).await,
        Command::Order { pair, taker } => order(&config, &pair, &taker).await,
        Command::Submit {
            request_id,
            signed_transaction,
        } => submit(&config, &request_id, &signed_transaction).await,
        Command::Ping => ping(&config).await,
        Command::Sum { n } => {
            sum(n);
            Ok(())
        }
        Command::Review { json } => show_review(json),
    }
}

fn aggregator(config: &AppConfig) -> Result<Arc<dyn SwapAggregator>> {
    let client = AggregatorClient::new(&config.jupiter_url, config.http_timeout)?;
    Ok(Arc::new(client))
}

/// Resolve both tokens and fill a form the way the UI would.
async fn build_form(
    config: &AppConfig,
    aggregator: &dyn SwapAggregator,
    pair: &PairArgs,
) -> Result<SwapForm> {
    let (input, output) = futures::try_join!(
        resolve_token(aggregator, &pair.input),
        resolve_token(aggregator, &pair.output)
    )?;
    tracing::info!(input = %input.symbol, output = %output.symbol, "[INIT] pair resolved");

    let mut form = SwapForm::new(config.default_slippage_bps);
    if let Some(bps) = pair.slippage_bps {
        form.set_slippage_bps(bps)?;
    }
    form.select_input(input)?;
    form.select_output(output)?;
    form.set_input_amount(&pair.amount);
    Ok(form)
}

fn print_form(form: &SwapForm) {
    let (Some(input), Some(output)) = (form.input_token(), form.output_token()) else {
        return;
    };
    println!(
        "{} {} -> {} {}",
        form.input_amount(),
        input.symbol,
        form.output_amount(),
        output.symbol
    );
    if let Some(summary) = form.summary() {
        if let Some(rate) = summary.rate {
            println!("  rate            1 ≈ {rate:.6}");
        }
        println!(
            "  price impact    {:.2}% ({:?})",
            summary.price_impact_pct, summary.impact
        );
        println!("  minimum recv.   {} {}", summary.minimum_received, output.symbol);
        println!("  platform fee    {:.2}%", summary.platform_fee_pct);
        println!("  network fee     {} SOL", summary.network_fee_sol);
        println!("  route hops      {}", summary.route_hops);
    }
    if let Some(reason) = form.quote_error() {
        println!("  note            {reason}");
    }
}

async fn search(config: &AppConfig, query: &str, limit: usize) -> Result<()> {
    let aggregator = aggregator(config)?;
    let tokens = aggregator.search(query).await?;
    tracing::info!(query, found = tokens.len(), "[SEARCH] results");
    for token in tokens.iter().take(limit) {
        let price = token
            .usd_price
            .map_or_else(|| "-".to_string(), |p| format!("${}", format_compact(p)));
        let verified = if token.is_verified { "verified" } else { "" };
        println!(
            "{:<10} {:<32} {:>12} {:>3}dp  {} {}",
            token.symbol,
            token.name,
            price,
            token.decimals,
            short_address(&token.id),
            verified
        );
    }
    Ok(())
}

async fn quote(config: &AppConfig, pair: &PairArgs, taker: Option<&str>) -> Result<()> {
    let aggregator = aggregator(config)?;
    let mut form = build_form(config, aggregator.as_ref(), pair).await?;
    let request = form
        .quote_request(taker)
        .context("amount must be positive and tokens distinct")?;

    let quote = aggregator.order(&request.order_params()).await?;
    let state = QuoteState::Ready {
        key: request.key(),
        quote: Arc::new(quote),
    };
    form.apply_quote(&state, taker);
    print_form(&form);
    Ok(())
}

async fn watch_quote(config: &AppConfig, pair: &PairArgs) -> Result<()> {
    let aggregator = aggregator(config)?;
    let mut form = build_form(config, aggregator.as_ref(), pair).await?;

    let poller = QuotePoller::spawn(aggregator, config.quote_refresh);
    let mut quote_rx = poller.subscribe();
    poller.set_request(form.quote_request(None));

    let (ping_tx, mut ping_rx) = watch::channel::<Option<u64>>(None);
    let ping_handle = utils::spawn_rpc_ping_watcher(
        &config.solana_rpc_url,
        ping_tx,
        config.rpc_ping_interval,
        config.http_timeout,
    )?;
    tracing::info!(
        refresh_secs = config.quote_refresh.as_secs(),
        ping_secs = config.rpc_ping_interval.as_secs(),
        "[INIT] watching, press Ctrl-C to stop"
    );

    loop {
        tokio::select! {
            changed = quote_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = quote_rx.borrow_and_update().clone();
                if form.apply_quote(&state, None) && form.quote().is_some() {
                    print_form(&form);
                } else if let Some(reason) = form.quote_error() {
                    tracing::warn!(%reason, "[QUOTE] unavailable");
                }
            }
            changed = ping_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let latency = *ping_rx.borrow_and_update();
                let level = PingLevel::from_latency(latency);
                match latency {
                    Some(ms) => tracing::info!(latency_ms = ms, ?level, "[RPC] ping"),
                    None => tracing::warn!(?level, "[RPC] unreachable"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("[SHUTDOWN] stopping watchers");
                break;
            }
        }
    }

    poller.stop();
    ping_handle.abort();
    Ok(())
}

async fn order(config: &AppConfig, pair: &PairArgs, taker: &str) -> Result<()> {
    let aggregator = aggregator(config)?;
    let form = build_form(config, aggregator.as_ref(), pair).await?;
    let request = form
        .quote_request(Some(taker))
        .context("amount must be positive and tokens distinct")?;

    let order = create_order(aggregator.as_ref(), &request.order_params()).await?;
    println!("request id   {}", order.request_id);
    println!("transaction  {}", STANDARD.encode(&order.unsigned_transaction));
    Ok(())
}

async fn submit(config: &AppConfig, request_id: &str, signed_transaction: &str) -> Result<()> {
    let aggregator = aggregator(config)?;
    let bytes = STANDARD
        .decode(signed_transaction.trim())
        .context("signed transaction is not valid base64")?;
    let report = submit_signed(aggregator.as_ref(), request_id, &bytes).await?;

    let status = match &report.status {
        SwapStatus::Success => "Success",
        SwapStatus::Failed => "Failed",
        SwapStatus::Other(raw) => raw.as_str(),
    };
    println!("status       {status}");
    if let Some(signature) = &report.signature {
        println!("explorer     {}", config.explorer_link(signature));
    }
    if let Some(error) = &report.error {
        println!("error        {error}");
    }
    Ok(())
}

async fn ping(config: &AppConfig) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;
    let latency = utils::ping_rpc(&client, &config.solana_rpc_url).await.ok();
    let level = PingLevel::from_latency(latency);
    match latency {
        Some(ms) => println!("{ms} ms ({level:?})"),
        None => println!("{level:?}"),
    }
    Ok(())
}

fn sum(n: i64) {
    let comparison = summation::compare_implementations(n);
    for m in &comparison.measurements {
        let value = match &m.value {
            Ok(v) => v.to_string(),
            Err(e) => e.reason(),
        };
        println!(
            "{:<10} {:<24} {:>20}  {:?}",
            m.name,
            m.complexity,
            value,
            m.elapsed
        );
    }
    match &comparison.expected {
        Ok(expected) => println!("expected   {expected}"),
        Err(e) => println!("expected   {}", e.reason()),
    }
    println!("all equal  {}", comparison.all_equal);
}

fn show_review(json: bool) -> Result<()> {
    let analysis = review::analyze();
    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }
    for issue in &analysis.issues {
        println!("[{}] {:?}: {}", issue.severity, issue.category, issue.title);
        println!("    {}", issue.description);
        println!("    fix: {}", issue.fix);
    }
    let s = analysis.summary;
    println!(
        "{} issues ({} high, {} medium, {} low)",
        s.total, s.high, s.medium, s.low
    );
    Ok(())
}
