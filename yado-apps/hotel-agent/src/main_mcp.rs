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

//! # Hotel Search MCP Server Entry Point
//!
//! Exposes the `getHotels` tool over stdio or streamable HTTP.
//!
//! Requires `APPLICATION_ID` in the environment (or a `.env` file).
//! Optional: `AFFILIATE_ID`, `RAKUTEN_API_ENDPOINT`, `YADO_POLICY_FILE`.

use anyhow::{Context, Error, Result};
use clap::{Parser, Subcommand};
use rmcp::handler::server::{ServerHandler, tool::ToolRouter, wrapper::Parameters};
use rmcp::service::serve_server;
use rmcp::tool;
use rmcp::tool_router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use yado_hotel_agent::{
    AppConfig, EXIT_CONFIG, GetHotelsResponse, HotelSearchService, RakutenTravelClient,
    SearchParams,
};

#[derive(Parser, Debug)]
#[command(name = "yado-hotel-mcp")]
#[command(author, version, about = "MCP server for nearby vacant-hotel search")]
struct Args {
    /// TOML search policy (overrides YADO_POLICY_FILE)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run MCP server over stdio (for Claude Desktop, etc.)
    Stdio,

    /// Run MCP server over HTTP
    Http {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, default_value = "8080")]
        port: u16,
    },
}

#[derive(Clone)]
pub struct HotelAgentServer {
    search: Arc<HotelSearchService>,
    tool_router: ToolRouter<Self>,
}

impl HotelAgentServer {
    pub fn new(search: Arc<HotelSearchService>) -> Self {
        Self {
            search,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl HotelAgentServer {
    #[tool(
        name = "getHotels",
        description = "Find vacant hotels near a location for a stay. Parameters: checkIn (YYYY-MM-DD), checkOut (YYYY-MM-DD, after checkIn), latitude/longitude (optional, default central Tokyo), radiusKm (optional, 0-3, default 2), maxPrice (optional nightly JPY ceiling, default 15000). Dormitory/capsule-style lodging is excluded; preferred chains are listed first, then by distance."
    )]
    async fn get_hotels(&self, params: Parameters<SearchParams>) -> Result<String, String> {
        match self.search.get_hotels(&params.0).await {
            GetHotelsResponse::Result(result) => {
                serde_json::to_string_pretty(&result).map_err(|e| e.to_string())
            }
            GetHotelsResponse::Error(message) => Err(message),
        }
    }
}

impl ServerHandler for HotelAgentServer {
    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl Future<Output = Result<rmcp::model::ListToolsResult, rmcp::ErrorData>> + Send + '_
    {
        tracing::debug!(
            "list_tools called, tools count: {}",
            self.tool_router.list_all().len()
        );
        Box::pin(async move {
            let tools = self.tool_router.list_all();
            Ok(rmcp::model::ListToolsResult::with_all_items(tools))
        })
    }

    fn call_tool(
        &self,
        request: rmcp::model::CallToolRequestParam,
        context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl Future<Output = Result<rmcp::model::CallToolResult, rmcp::ErrorData>> + Send + '_
    {
        let router = self.tool_router.clone();
        let self_clone = self.clone();
        Box::pin(async move {
            tracing::debug!("call_tool: {}", request.name);
            let context =
                rmcp::handler::server::tool::ToolCallContext::new(&self_clone, request, context);
            router.call(context).await
        })
    }

    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            protocol_version: rmcp::model::ProtocolVersion::V_2025_03_26,
            capabilities: rmcp::model::ServerCapabilities {
                tools: Some(rmcp::model::ToolsCapability::default()),
                ..Default::default()
            },
            server_info: rmcp::model::Implementation::from_build_env(),
            instructions: Some(
                "Use getHotels to list vacant hotels around a point for given check-in/check-out dates."
                    .to_string(),
            ),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Ctrl+C received, shutting down");
}

/// Fails fast, before any tool is registered, when the credential or policy is unusable.
fn build_search_service(args: &Args) -> Result<HotelSearchService> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    let policy = match config.load_policy(args.policy.as_ref()) {
        Ok(policy) => policy,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    tracing::debug!("Using endpoint {}", config.endpoint);
    let client =
        RakutenTravelClient::new(config.endpoint.clone()).context("Failed to create hotel client")?;
    Ok(HotelSearchService::new(client, config.credentials, &policy))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".to_string().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Args::parse();
    tracing::debug!("Parsed args: {:?}", args);

    let search = Arc::new(build_search_service(&args)?);

    match args.command {
        Command::Stdio => {
            let server = HotelAgentServer::new(search);
            let (stdin, stdout) = rmcp::transport::io::stdio();
            tracing::info!("Starting MCP server on stdio transport");
            let running = serve_server(server, (stdin, stdout))
                .await
                .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
            tokio::select! {
                quit = running.waiting() => {
                    if let Err(e) = quit {
                        tracing::error!("MCP service task failed: {}", e);
                    }
                    tracing::info!("MCP stdio session closed");
                }
                _ = shutdown_signal() => {}
            }
        }
        Command::Http { host, port } => {
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .context("Invalid host:port")?;
            tracing::info!("Starting MCP server over HTTP on {}", addr);
            let server = HotelAgentServer::new(search);
            let session_manager = Arc::new(LocalSessionManager::default());
            let config = StreamableHttpServerConfig {
                stateful_mode: true,
                ..Default::default()
            };
            let service =
                StreamableHttpService::new(move || Ok(server.clone()), session_manager, config);
            let app = axum::Router::new().nest_service("/mcp", service);
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .context("Failed to bind to address")?;
            tracing::debug!("Listening on {}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("HTTP server error")?;
        }
    }

    Ok(())
}
