use std::io::Write;

use crate::db::Persistence;
use crate::error::{SocratesError, SocratesResult};
use crate::model::Resource;
use crate::ops::registration_ops::{self, RegistrationOutcome};
use crate::ops::EventStoreGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    AddResource { name: String, limit: Option<i64> },
    Register { resource: String, member: String },
    Unregister { resource: String, member: String },
    Open { resource: String },
    Close { resource: String },
    Waitinglist { resource: String, enabled: bool },
    Copy { source: String, target: String },
    Help,
}

fn usage_error(message: impl Into<String>) -> SocratesError {
    SocratesError::Other(format!("{} (use 'help' for usage)", message.into()))
}

fn expect_args<'a>(args: &'a [String], count: usize, usage: &str) -> SocratesResult<&'a [String]> {
    if args.len() != count {
        return Err(usage_error(format!("usage: {}", usage)));
    }
    Ok(args)
}

/// Parses the words following the global options.
pub fn parse(args: &[String]) -> SocratesResult<Command> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Show);
    };

    match name.as_str() {
        "show" => {
            expect_args(rest, 0, "show")?;
            Ok(Command::Show)
        }
        "add-resource" => match rest {
            [name] => Ok(Command::AddResource {
                name: name.clone(),
                limit: None,
            }),
            [name, limit] => {
                let limit = limit
                    .parse()
                    .map_err(|_| usage_error(format!("limit is not a number: {}", limit)))?;
                Ok(Command::AddResource {
                    name: name.clone(),
                    limit: Some(limit),
                })
            }
            _ => Err(usage_error("usage: add-resource NAME [LIMIT]")),
        },
        "register" => {
            let args = expect_args(rest, 2, "register RESOURCE MEMBER")?;
            Ok(Command::Register {
                resource: args[0].clone(),
                member: args[1].clone(),
            })
        }
        "unregister" => {
            let args = expect_args(rest, 2, "unregister RESOURCE MEMBER")?;
            Ok(Command::Unregister {
                resource: args[0].clone(),
                member: args[1].clone(),
            })
        }
        "open" => {
            let args = expect_args(rest, 1, "open RESOURCE")?;
            Ok(Command::Open {
                resource: args[0].clone(),
            })
        }
        "close" => {
            let args = expect_args(rest, 1, "close RESOURCE")?;
            Ok(Command::Close {
                resource: args[0].clone(),
            })
        }
        "waitinglist" => {
            let args = expect_args(rest, 2, "waitinglist RESOURCE on|off")?;
            let enabled = match args[1].as_str() {
                "on" => true,
                "off" => false,
                other => return Err(usage_error(format!("expected on or off, got {}", other))),
            };
            Ok(Command::Waitinglist {
                resource: args[0].clone(),
                enabled,
            })
        }
        "copy" => {
            let args = expect_args(rest, 2, "copy SOURCE TARGET")?;
            Ok(Command::Copy {
                source: args[0].clone(),
                target: args[1].clone(),
            })
        }
        "help" => Ok(Command::Help),
        other => Err(usage_error(format!("unknown command: {}", other))),
    }
}

pub fn print_help(out: &mut impl Write) -> SocratesResult<()> {
    writeln!(out, "SoCraTes registration")?;
    writeln!(out)?;
    writeln!(out, "Usage: socrates [OPTIONS] [COMMAND]")?;
    writeln!(out)?;
    writeln!(out, "Options:")?;
    writeln!(out, "  -f, --file <PATH>              Database file path (default: .data/socrates.db)")?;
    writeln!(out, "  -h, --help                     Show this help")?;
    writeln!(out)?;
    writeln!(out, "Commands:")?;
    writeln!(out, "  show                           List resources and registrations (default)")?;
    writeln!(out, "  add-resource NAME [LIMIT]      Add an open resource")?;
    writeln!(out, "  register RESOURCE MEMBER       Register a member")?;
    writeln!(out, "  unregister RESOURCE MEMBER     Remove a registration")?;
    writeln!(out, "  open RESOURCE                  Open registration")?;
    writeln!(out, "  close RESOURCE                 Close registration")?;
    writeln!(out, "  waitinglist RESOURCE on|off    Toggle the waitinglist preference")?;
    writeln!(out, "  copy SOURCE TARGET             Add TARGET as an empty copy of SOURCE")?;
    Ok(())
}

fn print_resource(out: &mut impl Write, name: &str, resource: &Resource) -> SocratesResult<()> {
    let limit = resource
        .limit()
        .map_or_else(|| "unlimited".to_string(), |l| l.to_string());
    let mut flags = Vec::new();
    flags.push(if resource.registration_open() { "open" } else { "closed" });
    if resource.is_full() {
        flags.push("full");
    }
    if resource.with_waitinglist() {
        flags.push("waitinglist");
    }

    writeln!(
        out,
        "{} ({}/{}) [{}]",
        name,
        resource.registered_members().len(),
        limit,
        flags.join(", ")
    )?;
    for member in resource.registered_members() {
        writeln!(out, "  - {}", member)?;
    }
    Ok(())
}

/// Runs one command against the gateway, writing human-readable output.
pub fn execute<P: Persistence>(
    gateway: &EventStoreGateway<P>,
    save_attempts: u32,
    command: Command,
    out: &mut impl Write,
) -> SocratesResult<()> {
    match command {
        Command::Show => {
            let store = gateway.load_or_create()?;
            if store.resource_names().is_empty() {
                writeln!(out, "No resources yet.")?;
            }
            for name in store.resource_names() {
                if let Some(resource) = store.resource_named(name) {
                    print_resource(out, name, resource)?;
                }
            }
        }
        Command::AddResource { name, limit } => {
            let resource = registration_ops::add_resource(gateway, save_attempts, &name, limit)?;
            print_resource(out, name.trim(), &resource)?;
        }
        Command::Register { resource, member } => {
            let outcome =
                registration_ops::register_member(gateway, save_attempts, &resource, &member)?;
            let message = match outcome {
                RegistrationOutcome::Registered => "registered",
                RegistrationOutcome::AlreadyRegistered => "already registered",
                RegistrationOutcome::Closed => "not registered: registration is closed",
                RegistrationOutcome::Full => "not registered: resource is full",
            };
            writeln!(out, "{}: {}", member, message)?;
        }
        Command::Unregister { resource, member } => {
            let removed =
                registration_ops::unregister_member(gateway, save_attempts, &resource, &member)?;
            if removed {
                writeln!(out, "{}: unregistered", member)?;
            } else {
                writeln!(out, "{}: was not registered", member)?;
            }
        }
        Command::Open { resource: name } => {
            let resource = registration_ops::set_registration_open(gateway, save_attempts, &name, true)?;
            print_resource(out, name.trim(), &resource)?;
        }
        Command::Close { resource: name } => {
            let resource = registration_ops::set_registration_open(gateway, save_attempts, &name, false)?;
            print_resource(out, name.trim(), &resource)?;
        }
        Command::Waitinglist { resource: name, enabled } => {
            let resource =
                registration_ops::set_with_waitinglist(gateway, save_attempts, &name, enabled)?;
            print_resource(out, name.trim(), &resource)?;
        }
        Command::Copy { source, target } => {
            let resource = registration_ops::copy_resource(gateway, save_attempts, &source, &target)?;
            print_resource(out, target.trim(), &resource)?;
        }
        Command::Help => print_help(out)?,
    }
    Ok(())
}
