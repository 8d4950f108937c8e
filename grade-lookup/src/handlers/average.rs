use log::info;
use wire::Reply;

use crate::{errors::GradeError, message::AverageCode, roster::Roster};

pub fn handle_average(code: AverageCode, roster: &Roster) -> Result<Reply, GradeError> {
    info!("Received {} command from client", code);

    roster
        .average(code.assignment())
        .map(|average| Reply::ok(average.to_string()))
        .ok_or_else(|| GradeError::MissingAverage(code.assignment().to_string()))
}
