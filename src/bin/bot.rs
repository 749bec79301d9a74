use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::builder::{CreateButton, CreateSelectMenu};
use serenity::model::application::command::CommandOptionType;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::id::GuildId;

use harmonia::{
    Command, CommandOption, Config, GroupSlashCommand, Harmonia, MessageCommand, MessageComponent, SlashCommand,
    UserCommand,
};

const CLASSES: [(&str, &str); 4] = [
    ("Warrior", "warrior"),
    ("Mage", "mage"),
    ("Rogue", "rogue"),
    ("Cleric", "cleric"),
];

fn button(label: &str, custom_id: &str, style: ButtonStyle) -> MessageComponent {
    let mut button = CreateButton::default();
    button.label(label).custom_id(custom_id).style(style);
    button.into()
}

fn class_select() -> MessageComponent {
    let mut menu = CreateSelectMenu::default();
    menu.custom_id("class_select")
        .placeholder("Choose up to two classes")
        .min_values(1)
        .max_values(2)
        .options(|options| {
            for (label, value) in CLASSES {
                options.create_option(|option| option.label(label).value(value));
            }
            options
        });
    menu.into()
}

/// Buttons and a select menu handled by global component handlers
fn buttons_command(harmonia: &Harmonia, guild_id: Option<GuildId>) -> Result<SlashCommand> {
    harmonia.add_component_handler("button_yes", |_, inv| async move {
        inv.ephemeral_respond("You pressed yes!").await?;
        Ok(())
    })?;
    harmonia.add_component_handler("button_no", |_, inv| async move {
        inv.ephemeral_respond("You pressed no!").await?;
        Ok(())
    })?;
    harmonia.add_component_handler("class_select", |_, inv| async move {
        inv.ephemeral_respond(format!("You picked: {}", inv.values.join(", "))).await?;
        Ok(())
    })?;

    Ok(SlashCommand::new("buttons")
        .with_description("Show some buttons and a select menu")
        .with_guild_id(guild_id)
        .with_command(|_, inv| async move {
            inv.respond_with_components(
                "Make your choice:",
                vec![
                    vec![
                        button("Yes", "button_yes", ButtonStyle::Success),
                        button("No", "button_no", ButtonStyle::Danger),
                    ],
                    vec![class_select()],
                ],
            )
            .await?;
            Ok(())
        }))
}

/// Counter whose buttons only work on the message that showed them
fn number_command(guild_id: Option<GuildId>) -> SlashCommand {
    let number = Arc::new(AtomicI64::new(0));

    SlashCommand::new("number")
        .with_description("Increase or decrease the internal number!")
        .with_guild_id(guild_id)
        .with_command(move |harmonia, inv| {
            let number = Arc::clone(&number);
            async move {
                let current = number.load(Ordering::SeqCst);
                let message = inv
                    .respond_with_components(
                        format!("The current number is {current}!"),
                        vec![
                            vec![
                                button("Increase by 1", "n_increase", ButtonStyle::Success),
                                button("Decrease by 1", "n_decrease", ButtonStyle::Danger),
                            ],
                            vec![button("Reset to 0", "n_reset", ButtonStyle::Primary)],
                        ],
                    )
                    .await?;

                let caller = inv.author.as_ref().map(|author| author.id);
                for (custom_id, step) in [("n_increase", Some(1)), ("n_decrease", Some(-1)), ("n_reset", None)] {
                    let number = Arc::clone(&number);
                    harmonia.add_component_handler_to_message(message.id, custom_id, move |_, clicked| {
                        let number = Arc::clone(&number);
                        async move {
                            if clicked.author.as_ref().map(|author| author.id) != caller {
                                clicked
                                    .ephemeral_respond("Only the original caller of the function can use it!")
                                    .await?;
                                return Ok(());
                            }

                            let value = match step {
                                Some(step) => number.fetch_add(step, Ordering::SeqCst) + step,
                                None => {
                                    number.store(0, Ordering::SeqCst);
                                    0
                                }
                            };
                            clicked.ephemeral_respond(format!("The number is now {value}")).await?;
                            Ok(())
                        }
                    })?;
                }
                Ok(())
            }
        })
}

/// Deferred response, followup, then an edit of that followup
fn followup_command(guild_id: Option<GuildId>) -> SlashCommand {
    SlashCommand::new("followup")
        .with_description("Think for a moment, then answer")
        .with_guild_id(guild_id)
        .with_command(|_, inv| async move {
            inv.defer_response().await?;
            tokio::time::sleep(Duration::from_secs(2)).await;

            let message = inv.followup("Done thinking...").await?;
            tokio::time::sleep(Duration::from_secs(2)).await;
            message.edit("Done thinking! The answer is 42.").await?;

            inv.ephemeral_followup("This one is just for you.").await?;
            Ok(())
        })
}

/// Embed response with a locale line, then an embed followup
fn embed_command(guild_id: Option<GuildId>) -> SlashCommand {
    SlashCommand::new("embed")
        .with_description("Answer with an embed")
        .with_guild_id(guild_id)
        .with_command(|_, inv| async move {
            let locale = inv
                .interaction()
                .map(|interaction| interaction.locale().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let author = inv.author.as_ref().map(|author| author.display_name().to_string()).unwrap_or_default();

            inv.respond_complex(|response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|data| {
                        data.embed(|embed| {
                            embed
                                .title("Hello there")
                                .description(format!("Invoked by {author}"))
                                .field("Locale", locale, true)
                        })
                    })
            })
            .await?;

            inv.followup_complex(|followup| followup.embed(|embed| embed.description("And a followup embed.")))
                .await?;
            Ok(())
        })
}

fn options_command(guild_id: Option<GuildId>) -> SlashCommand {
    SlashCommand::new("options")
        .with_description("Echo back typed options")
        .with_guild_id(guild_id)
        .with_options([
            CommandOption::new("colour", CommandOptionType::String)
                .with_description("Pick a colour")
                .with_required(true)
                .add_choice("Red", "red")
                .add_choice("Green", "green")
                .add_choice("Blue", "blue"),
            CommandOption::new("amount", CommandOptionType::Integer)
                .with_description("How many")
                .add_choice("One", 1)
                .add_choice("Ten", 10),
            CommandOption::new("shout", CommandOptionType::Boolean).with_description("Use capitals"),
            CommandOption::new("who", CommandOptionType::User).with_description("Someone to mention"),
        ])
        .with_command(|_, inv| async move {
            let colour = inv.get_string("colour").unwrap_or("no colour");
            let amount = inv.get_integer("amount").unwrap_or(1);
            let mut reply = format!("{amount} x {colour}");
            if let Some(user_id) = inv.get_user_id("who") {
                reply.push_str(&format!(" for <@{user_id}>"));
            }
            if inv.get_bool("shout").unwrap_or(false) {
                reply = reply.to_uppercase();
            }
            inv.respond(reply).await?;
            Ok(())
        })
}

/// `/tag add`, `/tag remove` and the nested `/tag colour set`
fn tag_command(guild_id: Option<GuildId>) -> GroupSlashCommand {
    let name_option = || {
        CommandOption::new("name", CommandOptionType::String)
            .with_description("Tag name")
            .with_required(true)
    };

    let add = SlashCommand::new("add")
        .with_description("Add a tag")
        .with_options([name_option()])
        .with_command(|_, inv| async move {
            let name = inv.get_string("name").unwrap_or_default();
            inv.respond(format!("Added tag `{name}`")).await?;
            Ok(())
        });
    let remove = SlashCommand::new("remove")
        .with_description("Remove a tag")
        .with_options([name_option()])
        .with_command(|_, inv| async move {
            let name = inv.get_string("name").unwrap_or_default();
            inv.respond(format!("Removed tag `{name}`")).await?;
            Ok(())
        });
    let set_colour = SlashCommand::new("set")
        .with_description("Set a tag colour")
        .with_options([
            name_option(),
            CommandOption::new("colour", CommandOptionType::String)
                .with_description("Colour")
                .with_required(true),
        ])
        .with_command(|_, inv| async move {
            let name = inv.get_string("name").unwrap_or_default();
            let colour = inv.get_string("colour").unwrap_or_default();
            inv.respond(format!("Tag `{name}` is now {colour}")).await?;
            Ok(())
        });

    let colour = GroupSlashCommand::new("colour")
        .with_description("Tag colours")
        .with_subcommands([Arc::new(set_colour) as Arc<dyn Command>]);

    GroupSlashCommand::new("tag")
        .with_description("Manage tags")
        .with_guild_id(guild_id)
        .with_subcommands([
            Arc::new(add) as Arc<dyn Command>,
            Arc::new(remove) as Arc<dyn Command>,
            Arc::new(colour) as Arc<dyn Command>,
        ])
}

fn inspect_command(guild_id: Option<GuildId>) -> UserCommand {
    UserCommand::new("Inspect")
        .with_guild_id(guild_id)
        .with_command(|_, inv| async move {
            let target = inv.target_author().await?;
            let mut reply = format!("**{}** ({})", target.display_name(), target.id);
            if target.is_member {
                let roles: Vec<&str> = target.roles.iter().map(|role| role.name.as_str()).collect();
                reply.push_str(&format!("\nRoles: {}", roles.join(", ")));
                if let Some(joined_at) = target.joined_at {
                    reply.push_str(&format!("\nJoined: {}", joined_at.format("%Y-%m-%d")));
                }
            }
            inv.ephemeral_respond(reply).await?;
            Ok(())
        })
}

fn quote_command(guild_id: Option<GuildId>) -> MessageCommand {
    MessageCommand::new("Quote")
        .with_guild_id(guild_id)
        .with_command(|_, inv| async move {
            let message = inv.target_message().await?;
            inv.respond(format!("> {}\n- {}", message.content, message.author.name))
                .await?;
            Ok(())
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting harmonia demo bot...");
    match config.discord_guild_id {
        Some(guild_id) => info!("🔧 Development mode: registering commands for guild {guild_id}"),
        None => info!("🌍 Registering commands globally"),
    }

    let harmonia = Arc::new(Harmonia::new());
    let guild_id = config.discord_guild_id;

    harmonia.add_command(buttons_command(&harmonia, guild_id)?)?;
    harmonia.add_command(number_command(guild_id))?;
    harmonia.add_command(followup_command(guild_id))?;
    harmonia.add_command(embed_command(guild_id))?;
    harmonia.add_command(options_command(guild_id))?;
    harmonia.add_command(tag_command(guild_id))?;
    harmonia.add_command(inspect_command(guild_id))?;
    harmonia.add_command(quote_command(guild_id))?;

    let mut client = harmonia.client(&config.discord_token).await?;
    let shard_manager = client.shard_manager.clone();

    let runner = tokio::spawn(async move {
        if let Err(why) = client.start().await {
            error!("Gateway connection failed: {why:?}");
        }
    });

    info!("Press Ctrl+C to exit");
    tokio::signal::ctrl_c().await?;

    if config.remove_commands {
        match harmonia.remote_commands(guild_id).await {
            Ok(remote) => {
                let names: Vec<&str> = remote.iter().map(|command| command.name.as_str()).collect();
                info!("Removing registered commands: {}", names.join(", "));
            }
            Err(e) => error!("❌ Failed to list remote commands: {e}"),
        }
        if let Err(e) = harmonia.remove_all_commands().await {
            error!("❌ Failed to remove commands: {e}");
        }
    }

    shard_manager.lock().await.shutdown_all().await;
    let _ = runner.await;

    info!("Gracefully shutting down.");
    Ok(())
}
