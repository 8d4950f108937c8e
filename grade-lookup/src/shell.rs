//! Interactive front end for [`GradeClient`]. Reads commands line by line and
//! writes the answers; the protocol work lives in the client.

use std::io::IsTerminal;

use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::{client::GradeClient, message::AverageCode, types::Grades};

pub const PROMPT: &str = "Enter command: ";
pub const PASSWORD_PROMPT: &str = "Enter Password: ";
pub const GRADES_TOKEN: &str = "GG";
pub const QUIT: &str = "q";

/// Where the shell reads passwords from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PasswordInput {
    /// The next line of the command input, echoed like any other.
    Lines,
    /// The controlling terminal, with echo turned off.
    Terminal,
}

impl PasswordInput {
    /// Hidden terminal input when stdin is a terminal, plain lines otherwise.
    pub fn for_stdin() -> Self {
        Self::for_terminal(std::io::stdin().is_terminal())
    }

    pub fn for_terminal(is_terminal: bool) -> Self {
        if is_terminal {
            PasswordInput::Terminal
        } else {
            PasswordInput::Lines
        }
    }
}

/// Runs the shell, reading passwords from `input` like everything else.
pub async fn run<R, W>(client: &GradeClient, input: R, output: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    run_with(client, input, output, PasswordInput::Lines).await
}

pub async fn run_with<R, W>(
    client: &GradeClient,
    input: R,
    mut output: W,
    passwords: PasswordInput,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        let Some(line) = prompt(&mut lines, &mut output, PROMPT).await? else {
            break;
        };
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if command == QUIT {
            break;
        }

        let response = if command.eq_ignore_ascii_case(GRADES_TOKEN) {
            let Some(id) = prompt(&mut lines, &mut output, "Enter Student ID: ").await? else {
                break;
            };
            let password = match passwords {
                PasswordInput::Lines => prompt(&mut lines, &mut output, PASSWORD_PROMPT).await?,
                PasswordInput::Terminal => {
                    output.flush().await?;
                    Some(read_hidden_password().await?)
                }
            };
            let Some(password) = password else {
                break;
            };
            match client.fetch_grades(id.trim(), password.trim()).await {
                Ok(grades) => render_grades(&grades),
                Err(e) => e.to_string(),
            }
        } else {
            match command.parse::<AverageCode>() {
                Ok(code) => match client.fetch_average(code).await {
                    Ok(average) => format!("{} average: {}", code.assignment(), average),
                    Err(e) => e.to_string(),
                },
                Err(e) => e.to_string(),
            }
        };

        output.write_all(response.as_bytes()).await?;
        output.write_all(b"\n").await?;
    }

    output.flush().await
}

async fn prompt<R, W>(
    lines: &mut Lines<R>,
    output: &mut W,
    text: &str,
) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    lines.next_line().await
}

/// Prompts on the terminal and reads a line without echoing it.
async fn read_hidden_password() -> io::Result<String> {
    tokio::task::spawn_blocking(|| rpassword::prompt_password(PASSWORD_PROMPT))
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

fn render_grades(grades: &Grades) -> String {
    grades
        .iter()
        .map(|(assignment, grade)| format!("{assignment}: {grade}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_commands_never_reach_the_server() {
        // Nothing listens on port 9 of localhost; an attempt to connect would print an error.
        let client = GradeClient::new("127.0.0.1:9".parse().unwrap());
        let mut output = Vec::new();

        run(&client, "hello\n\nq\n".as_bytes(), &mut output)
            .await
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Invalid command. Please try again."));
        assert_eq!(output.matches(PROMPT).count(), 3);
    }

    #[test]
    fn passwords_are_hidden_only_on_a_terminal() {
        assert_eq!(PasswordInput::for_terminal(true), PasswordInput::Terminal);
        assert_eq!(PasswordInput::for_terminal(false), PasswordInput::Lines);
    }

    #[tokio::test]
    async fn piped_passwords_come_from_the_input() {
        // The password line is consumed as a password, not run as a command.
        let client = GradeClient::new("127.0.0.1:9".parse().unwrap());
        let mut output = Vec::new();

        run_with(
            &client,
            "GG\n1803933\nq\nq\n".as_bytes(),
            &mut output,
            PasswordInput::Lines,
        )
        .await
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Enter Student ID: "));
        assert!(output.contains(PASSWORD_PROMPT));
        assert_eq!(output.matches(PROMPT).count(), 2);
    }

    #[test]
    fn grades_render_one_per_line() {
        let grades = vec![
            ("Midterm".to_string(), "85".to_string()),
            ("Lab 1".to_string(), "90".to_string()),
        ];
        assert_eq!(render_grades(&grades), "Midterm: 85\nLab 1: 90");
    }
}
