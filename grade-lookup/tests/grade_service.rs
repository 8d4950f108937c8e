use std::{io::Write, net::SocketAddr, sync::Arc};

use futures::{SinkExt, StreamExt};
use grade_lookup::{
    client::GradeClient,
    errors::GradeError,
    message::{AverageCode, GradeRequest, GRADES_CMD},
    roster::Roster,
    server, shell,
};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{FramedRead, FramedWrite};
use wire::{ReplyCodec, Request, RequestCodec, Status};

const CSV: &str = "\
ID Number,Password,Last Name,First Name,Midterm,Lab 1,Lab 2,Lab 3,Lab 4
1803933,xyz,Smith,Jane,85,90,88,92,79
1884159,abc,Doe,John,72,60,77,81,65
1853847,password123,Nguyen,Linh,91,95,99,88,97
Averages,,,,82.7,81.7,88,87,80.3
";

const STUDENTS: [(&str, &str); 3] = [
    ("1803933", "xyz"),
    ("1884159", "abc"),
    ("1853847", "password123"),
];

async fn start_server() -> (SocketAddr, Arc<Roster>) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CSV.as_bytes()).unwrap();
    let roster = Arc::new(Roster::load(file.path()).unwrap());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::run(listener, Arc::clone(&roster)));

    (addr, roster)
}

#[tokio::test]
async fn every_student_gets_exactly_their_grades() {
    let (addr, roster) = start_server().await;
    let client = GradeClient::new(addr);

    for (id, password) in STUDENTS {
        let grades = client.fetch_grades(id, password).await.unwrap();
        assert_eq!(grades, roster.student(id).unwrap().grades);
    }
}

#[tokio::test]
async fn wrong_id_and_wrong_password_look_the_same() {
    let (addr, _) = start_server().await;
    let client = GradeClient::new(addr);

    let wrong_password = client
        .request(GradeRequest::Grades(grade_lookup::auth::credential_digest(
            "1803933", "abc",
        )))
        .await
        .unwrap();
    let wrong_id = client
        .request(GradeRequest::Grades(grade_lookup::auth::credential_digest(
            "0000000", "xyz",
        )))
        .await
        .unwrap();

    assert_eq!(wrong_password.status, Status::AuthFailed);
    assert_eq!(wrong_password, wrong_id);

    assert!(matches!(
        client.fetch_grades("1803933", "nope").await,
        Err(GradeError::AuthFailed)
    ));
}

#[tokio::test]
async fn averages_come_from_the_averages_row() {
    let (addr, _) = start_server().await;
    let client = GradeClient::new(addr);

    assert_eq!(client.fetch_average(AverageCode::Midterm).await.unwrap(), "82.7");
    assert_eq!(client.fetch_average(AverageCode::Lab4).await.unwrap(), "80.3");
}

#[tokio::test]
async fn malformed_requests_get_protocol_errors_on_a_live_connection() {
    let (addr, _) = start_server().await;
    let stream = TcpStream::connect(addr).await.unwrap();
    let (reader, writer) = stream.into_split();
    let mut reader = FramedRead::new(reader, ReplyCodec::new());
    let mut writer = FramedWrite::new(writer, RequestCodec::new());

    writer
        .send(Request::new(GRADES_CMD, vec![1u8; 5]))
        .await
        .unwrap();
    let reply = reader.next().await.unwrap().unwrap();
    assert_eq!(reply.status, Status::ProtocolError);

    // Same connection keeps working.
    writer
        .send(Request::from(GradeRequest::Average(AverageCode::Lab2)))
        .await
        .unwrap();
    let reply = reader.next().await.unwrap().unwrap();
    assert_eq!(reply.status, Status::Ok);
    assert_eq!(reply.text(), "88");
}

#[tokio::test]
async fn shell_prints_grades_and_averages() {
    let (addr, _) = start_server().await;
    let client = GradeClient::new(addr);
    let mut output = Vec::new();

    let input = "gla1\nGG\n1884159\nabc\nGG\n1884159\nwrong\nq\n";
    shell::run(&client, input.as_bytes(), &mut output)
        .await
        .unwrap();

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("Lab 1 average: 81.7"));
    assert!(output.contains("Midterm: 72\nLab 1: 60\nLab 2: 77\nLab 3: 81\nLab 4: 65"));
    assert!(output.contains("Invalid student ID or password. Please try again."));
}
