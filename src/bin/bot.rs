use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::builder::CreateApplicationCommand;
use serenity::http::Http;
use serenity::model::application::command::Command;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;

use switchboard::components::{
    ComponentContext, ComponentHandler, ComponentManager, ComponentRegistry, DispatchOutcome,
};
use switchboard::core::Config;
use switchboard::transport::{component_context, modal_context};
use switchboard::{demo_components, register_builtins};

const COMPONENTS_COMMAND: &str = "components";
const EXPIRED_NOTICE: &str = "⌛ This control is no longer available.";
const BUSY_NOTICE: &str = "⏳ This control is being used right now. Please try again in a moment.";

struct Handler {
    manager: Arc<ComponentManager>,
    guild_id: Option<GuildId>,
}

impl Handler {
    fn new(manager: Arc<ComponentManager>, guild_id: Option<GuildId>) -> Self {
        Handler { manager, guild_id }
    }

    /// Post the demo message with a fresh set of components for the invoking user
    async fn handle_components_command(
        &self,
        http: &Http,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let rows = demo_components(&self.manager, &command.user.id.to_string())?;

        command
            .create_interaction_response(http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .content("🎛️ Try the controls below. The menu only answers to you.")
                            .set_components(rows)
                    })
            })
            .await?;

        info!(
            "Posted component demo for user {} ({} dynamic components live)",
            command.user.id,
            self.manager.handler().dynamic_count()
        );
        Ok(())
    }
}

/// Dispatch one component or modal interaction and cover the unresolved case
async fn dispatch_interaction(manager: Arc<ComponentManager>, ctx: ComponentContext) {
    let custom_id = ctx.custom_id.clone();
    let notice = match manager.dispatch(&custom_id, &ctx).await {
        DispatchOutcome::Unresolved => EXPIRED_NOTICE,
        DispatchOutcome::Busy => BUSY_NOTICE,
        outcome => {
            debug!("Interaction {custom_id} finished: {outcome:?}");
            return;
        }
    };
    if !ctx.responder.is_acknowledged() {
        if let Err(e) = ctx.responder.send_ephemeral(notice).await {
            warn!("Failed to send notice for {custom_id}: {e}");
        }
    }
}

fn create_components_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name(COMPONENTS_COMMAND)
        .description("Show a message with interactive buttons and menus");
    command
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());

        let registered = if let Some(guild_id) = self.guild_id {
            guild_id
                .set_application_commands(&ctx.http, |commands| {
                    commands.add_application_command(create_components_command())
                })
                .await
                .map(|_| info!("Guild commands registered for guild {guild_id}"))
        } else {
            Command::create_global_application_command(&ctx.http, |command| {
                *command = create_components_command();
                command
            })
            .await
            .map(|_| info!("Global commands registered"))
        };

        if let Err(e) = registered {
            error!("Failed to register /{COMPONENTS_COMMAND}: {e}");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                if command.data.name != COMPONENTS_COMMAND {
                    debug!("Ignoring unknown command /{}", command.data.name);
                    return;
                }
                if let Err(e) = self.handle_components_command(&ctx.http, &command).await {
                    error!("Error handling /{COMPONENTS_COMMAND}: {e}");

                    let _ = command
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message
                                        .content("❌ Sorry, I couldn't build the controls. Please try again.")
                                        .ephemeral(true)
                                })
                        })
                        .await;
                }
            }
            Interaction::MessageComponent(component) => {
                debug!(
                    "Component interaction {} from user {}",
                    component.data.custom_id, component.user.id
                );
                let dispatch_ctx = component_context(Arc::clone(&ctx.http), component);
                tokio::spawn(dispatch_interaction(Arc::clone(&self.manager), dispatch_ctx));
            }
            Interaction::ModalSubmit(modal) => {
                debug!(
                    "Modal submission {} from user {}",
                    modal.data.custom_id, modal.user.id
                );
                let dispatch_ctx = modal_context(Arc::clone(&ctx.http), modal);
                tokio::spawn(dispatch_interaction(Arc::clone(&self.manager), dispatch_ctx));
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting component bot...");

    let registry = Arc::new(ComponentRegistry::new());
    register_builtins(&registry)?;
    info!(
        "🧩 {} persistent components and {} factories registered",
        registry.len(),
        registry.all_factories().len()
    );

    let handler = Arc::new(ComponentHandler::new(registry));
    let manager = Arc::new(ComponentManager::with_default_timeout(
        handler,
        config.component_timeout,
    ));
    manager.start_sweep(config.sweep_interval);

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let intents = GatewayIntents::GUILDS;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler::new(Arc::clone(&manager), guild_id))
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    let shard_manager = Arc::clone(&client.shard_manager);
    let shutdown_manager = Arc::clone(&manager);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {e}");
            return;
        }
        info!("Shutdown requested, stopping component sweep");
        shutdown_manager.stop_sweep();
        shard_manager.lock().await.shutdown_all().await;
    });

    info!("Establishing WebSocket connection to Discord gateway...");

    let started = client.start().await;
    manager.stop_sweep();

    if let Err(why) = started {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    info!("Bot stopped");
    Ok(())
}
