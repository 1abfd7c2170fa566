//!  Yado Hotel Agent
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//!
//! # Examples
//!
//! ## Basic search (around the default origin in central Tokyo)
//!
//! ```bash
//! yado-hotels -i 2026-02-15 -o 2026-02-17
//! ```
//!
//! ## Search around a point with a tighter radius and budget
//!
//! ```bash
//! # Near Osaka station, 1.5 km, at most 9000 JPY per night
//! yado-hotels -i 2026-03-01 -o 2026-03-02 --lat 34.7025 --lon 135.4959 -r 1.5 -p 9000
//! ```
//!
//! ## Custom ranking policy
//!
//! ```bash
//! yado-hotels -i 2026-03-01 -o 2026-03-02 --policy ./policy.toml
//! ```
//!
//! ## Dry run (show the upstream URL only, credentials masked)
//!
//! ```bash
//! yado-hotels -i 2026-02-15 -o 2026-02-17 --dry-run
//! ```
//!
//! # Output
//!
//! The tool prints a summary of the search parameters followed by the ranked hotels with:
//! - Name and preferred-chain rank
//! - Minimum nightly charge
//! - Distance from the search origin
//! - Nearest station, review score and number of room offers

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use yado_hotel_agent::{AppConfig, EXIT_CONFIG, HotelSearchService, RakutenTravelClient, SearchParams};

#[derive(Parser, Debug)]
#[command(name = "yado-hotels")]
#[command(version = "0.1.0")]
#[command(about = "Search nearby vacant hotels via the Rakuten Travel API")]
struct Args {
    #[arg(short = 'i', long, help = "Check-in date (YYYY-MM-DD)")]
    checkin: String,
    #[arg(short = 'o', long, help = "Check-out date (YYYY-MM-DD)")]
    checkout: String,
    #[arg(long, allow_hyphen_values = true, help = "Origin latitude")]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true, help = "Origin longitude")]
    lon: Option<f64>,
    #[arg(short = 'r', long, help = "Search radius in km (0-3)")]
    radius: Option<f64>,
    #[arg(short = 'p', long, help = "Maximum price per night (JPY)")]
    max_price: Option<f64>,
    #[arg(long, help = "TOML search policy (overrides YADO_POLICY_FILE)")]
    policy: Option<PathBuf>,
    #[arg(short = 'n', long, default_value = "10")]
    limit: usize,
    #[arg(long, help = "Show upstream URL without making request")]
    dry_run: bool,
}

impl Args {
    fn search_params(&self) -> SearchParams {
        SearchParams {
            check_in: Some(self.checkin.clone()),
            check_out: Some(self.checkout.clone()),
            latitude: self.lat,
            longitude: self.lon,
            radius_km: self.radius,
            max_price: self.max_price,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let args = Args::parse();

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(EXIT_CONFIG);
    });
    let policy = config.load_policy(args.policy.as_ref()).unwrap_or_else(|e| {
        eprintln!("Policy error: {}", e);
        std::process::exit(EXIT_CONFIG);
    });

    let endpoint = config.endpoint.clone();
    let client = RakutenTravelClient::new(endpoint.clone())?;
    let service = HotelSearchService::new(client, config.credentials, &policy);

    let params = args.search_params();
    let query = match params.validate() {
        Ok(query) => query,
        Err(e) => {
            eprintln!("Invalid search: {}", e);
            std::process::exit(2);
        }
    };
    let defaults = service.ranker().defaults();
    let origin = query.effective_origin(defaults);

    println!("\n🏨 Vacant Hotel Search");
    println!("======================");
    println!(
        "Dates: {} to {} ({} night(s))",
        query.check_in,
        query.check_out,
        query.nights()
    );
    println!("Origin: {:.6}, {:.6}", origin.latitude, origin.longitude);
    println!("Radius: {} km", query.effective_radius_km(defaults));
    println!("Max price: ¥{}", query.effective_max_price(defaults));
    println!("======================");

    if args.dry_run {
        let upstream = service.prepare(&params)?;
        println!("\n🔗 Request URL:\n{}", upstream.redacted_url(&endpoint));
        return Ok(());
    }

    match service.search(&params).await {
        Ok(results) => {
            if results.hotels.is_empty() {
                println!("No hotels found.");
                return Ok(());
            }
            println!(
                "Found {} hotel(s) (upstream reported {})\n",
                results.hotels.len(),
                results.paging_info.record_count
            );
            let ranker = service.ranker();
            for (i, hotel) in results.hotels.iter().take(args.limit).enumerate() {
                println!("{}. {}", i + 1, hotel.name());
                if let Some(priority) = ranker.chain_priority(hotel) {
                    println!("   Preferred chain #{}", priority);
                }
                if let Some(charge) = hotel.min_charge() {
                    println!("   From: ¥{}", charge);
                }
                let distance = ranker.distance_km(hotel, origin);
                if distance.is_finite() {
                    println!("   Distance: {:.2} km", distance);
                }
                let info = &hotel.hotel_basic_info;
                if let Some(station) = &info.nearest_station {
                    println!("   Station: {}", station);
                }
                if let Some(avg) = info.review_average {
                    println!(
                        "   Rating: {:.2} ({} reviews)",
                        avg,
                        info.review_count.unwrap_or(0)
                    );
                }
                if !hotel.room_info_list.is_empty() {
                    println!("   Room offers: {}", hotel.room_info_list.len());
                }
                println!();
            }
        }
        Err(e) => {
            eprintln!("Search failed: {:#}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}
