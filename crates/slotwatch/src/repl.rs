use anyhow::Context;
use slotwatch_common::calendar::{format_iso_date, parse_iso_date};
use slotwatch_common::job::{MonitorJob, TimeWindow};
use slotwatch_engine::scheduler::SchedulerCommand;
use std::io::Write;
use std::str::SplitWhitespace;
use time::Date;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};

const BANNER: &[&str] = &[
    "Job control ready. Commands:",
    "  add <YYYY-MM-DD> [lunch|dinner|any] [guests]",
    "  remove <job-id>",
    "  list",
    "  check <YYYY-MM-DD> [lunch|dinner|any] [guests]",
    "Type 'exit' or 'quit' to stop.",
];

pub async fn run(commands: mpsc::Sender<SchedulerCommand>) -> anyhow::Result<()> {
    for line in BANNER {
        println!("{line}");
    }

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin).lines();
    let mut stdout = std::io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let Some(line) = reader.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        match dispatch(&commands, line).await {
            Ok(output) => println!("{output}"),
            Err(err) => println!("Error: {err}"),
        }
    }
    Ok(())
}

async fn dispatch(
    commands: &mpsc::Sender<SchedulerCommand>,
    line: &str,
) -> anyhow::Result<String> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        anyhow::bail!("empty command");
    };

    match command {
        "add" => {
            let (date, window, party_size) = parse_request(parts)?;
            let (reply, response) = oneshot::channel();
            send(
                commands,
                SchedulerCommand::Add {
                    date,
                    window,
                    party_size,
                    reply,
                },
            )
            .await?;
            match recv(response).await? {
                Ok(id) => Ok(format!("Job {id} added")),
                Err(e) => Ok(format!("Rejected: {e}")),
            }
        }
        "remove" => {
            let id = parts
                .next()
                .context("usage: remove <job-id>")?
                .to_string();
            let (reply, response) = oneshot::channel();
            send(commands, SchedulerCommand::Remove { id: id.clone(), reply }).await?;
            if recv(response).await? {
                Ok(format!("Job {id} removed"))
            } else {
                Ok(format!("No job with id {id}"))
            }
        }
        "list" => {
            let (reply, response) = oneshot::channel();
            send(commands, SchedulerCommand::List { reply }).await?;
            let jobs = recv(response).await?;
            if jobs.is_empty() {
                Ok("No jobs".into())
            } else {
                Ok(jobs.iter().map(format_job).collect::<Vec<_>>().join("\n"))
            }
        }
        "check" => {
            let (date, window, party_size) = parse_request(parts)?;
            let (reply, response) = oneshot::channel();
            send(
                commands,
                SchedulerCommand::Check {
                    date,
                    window,
                    party_size,
                    reply,
                },
            )
            .await?;
            let result = recv(response).await?;
            Ok(serde_json::to_string_pretty(&result)?)
        }
        "help" => Ok(BANNER.join("\n")),
        other => anyhow::bail!("unknown command '{other}', try 'help'"),
    }
}

async fn send(
    commands: &mpsc::Sender<SchedulerCommand>,
    command: SchedulerCommand,
) -> anyhow::Result<()> {
    commands
        .send(command)
        .await
        .map_err(|_| anyhow::anyhow!("scheduler task stopped"))
}

async fn recv<T>(response: oneshot::Receiver<T>) -> anyhow::Result<T> {
    response
        .await
        .map_err(|_| anyhow::anyhow!("scheduler task stopped"))
}

fn parse_request(
    mut parts: SplitWhitespace<'_>,
) -> anyhow::Result<(Date, TimeWindow, Option<u32>)> {
    let date = parse_iso_date(parts.next().context("a date is required (YYYY-MM-DD)")?)?;
    let window = parts
        .next()
        .map_or(TimeWindow::Dinner, |w| w.parse().unwrap_or(TimeWindow::Any));
    let party_size = parts
        .next()
        .map(|g| g.parse::<u32>())
        .transpose()
        .context("guests must be a number")?;
    Ok((date, window, party_size))
}

fn format_job(job: &MonitorJob) -> String {
    let status = if job.notified {
        "notified"
    } else if job.enabled {
        "watching"
    } else {
        "disabled"
    };
    format!(
        "{}  {}  {}  {} guests  {}",
        job.id,
        format_iso_date(job.date),
        job.window,
        job.party_size,
        status
    )
}
