use super::message::{Message, Status};
use crate::error::{Error, Result};

/// Serialize a message into its wire frame.
///
/// Content lines are joined by `\n` and the frame is closed with the blank
/// terminator line, so every frame ends in two newlines. The field shape is
/// guaranteed by the [`Message`] constructors; fields a status does not
/// carry are not emitted.
pub fn encode(message: &Message) -> String {
    let mut lines: Vec<&str> = Vec::with_capacity(3);
    lines.push(message.status.as_str());

    match message.status {
        Status::Get => {
            lines.push(message.key.as_deref().unwrap_or(""));
        }
        Status::Put => {
            lines.push(message.key.as_deref().unwrap_or(""));
            // Delete-PUT omits the value line entirely
            if let Some(value) = message.value.as_deref() {
                lines.push(value);
            }
        }
        Status::GetSuccess | Status::PutSuccess | Status::PutUpdate | Status::DeleteSuccess => {
            lines.push(message.key.as_deref().unwrap_or(""));
            lines.push(message.value.as_deref().unwrap_or(""));
        }
        Status::GetError | Status::PutError | Status::DeleteError => {
            lines.push(message.value.as_deref().unwrap_or(""));
        }
    }

    let mut frame = lines.join("\n");
    frame.push_str("\n\n");
    frame
}

/// Parse a message from the content lines of one frame (blank terminator
/// already stripped).
///
/// Dispatches on the status token in line 0; any unknown token, a line count
/// outside the range the status allows, or an empty frame is a protocol
/// error.
pub fn decode(lines: &[String]) -> Result<Message> {
    let status_line = lines
        .first()
        .ok_or_else(|| Error::Protocol("empty frame".to_string()))?;
    let status: Status = status_line.parse()?;

    match status {
        Status::Get => {
            expect_lines(status, lines, 2, 2)?;
            Ok(Message::get(lines[1].clone()))
        }
        Status::Put => {
            expect_lines(status, lines, 2, 3)?;
            Ok(Message::put(lines[1].clone(), lines.get(2).cloned()))
        }
        Status::GetSuccess | Status::PutSuccess | Status::PutUpdate | Status::DeleteSuccess => {
            expect_lines(status, lines, 3, 3)?;
            Ok(Message::success(status, lines[1].clone(), lines[2].clone()))
        }
        Status::GetError | Status::PutError | Status::DeleteError => {
            expect_lines(status, lines, 2, 2)?;
            Ok(Message::error(status, lines[1].clone()))
        }
    }
}

fn expect_lines(status: Status, lines: &[String], min: usize, max: usize) -> Result<()> {
    if lines.len() < min || lines.len() > max {
        return Err(Error::Protocol(format!(
            "wrong number of lines for {}: {}",
            status,
            lines.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_lines(frame: &str) -> Vec<String> {
        // Split the way the connection handler accumulates: content lines
        // up to the blank terminator.
        frame
            .split('\n')
            .take_while(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn encode_get_request() {
        assert_eq!(encode(&Message::get("foo")), "GET\nfoo\n\n");
    }

    #[test]
    fn encode_put_upsert_and_delete() {
        assert_eq!(
            encode(&Message::put("foo", Some("bar".to_string()))),
            "PUT\nfoo\nbar\n\n"
        );
        // No value line at all for a delete request
        assert_eq!(encode(&Message::put("foo", None)), "PUT\nfoo\n\n");
    }

    #[test]
    fn encode_success_and_error_responses() {
        assert_eq!(
            encode(&Message::success(Status::PutUpdate, "foo", "baz")),
            "PUT_UPDATE\nfoo\nbaz\n\n"
        );
        assert_eq!(
            encode(&Message::error(Status::GetError, "Specified key not found")),
            "GET_ERROR\nSpecified key not found\n\n"
        );
    }

    #[test]
    fn decode_inverts_encode_for_all_valid_messages() {
        let messages = [
            Message::get("k"),
            Message::put("k", Some("v".to_string())),
            Message::put("k", None),
            Message::success(Status::GetSuccess, "k", "v"),
            Message::success(Status::PutSuccess, "k", "v"),
            Message::success(Status::PutUpdate, "k", "v"),
            Message::success(Status::DeleteSuccess, "k", "v"),
            Message::error(Status::GetError, "diagnostic"),
            Message::error(Status::PutError, "diagnostic"),
            Message::error(Status::DeleteError, "diagnostic"),
        ];
        for message in messages {
            let lines = to_lines(&encode(&message));
            assert_eq!(decode(&lines).unwrap(), message);
        }
    }

    #[test]
    fn decode_rejects_empty_frame() {
        let err = decode(&[]).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn decode_rejects_unknown_status() {
        let lines = vec!["FETCH".to_string(), "foo".to_string()];
        assert!(matches!(decode(&lines), Err(Error::Protocol(_))));
    }

    #[test]
    fn decode_rejects_wrong_line_counts() {
        let cases: &[&[&str]] = &[
            &["GET"],
            &["GET", "key", "extra"],
            &["PUT", "key", "value", "extra"],
            &["PUT"],
            &["GET_SUCCESS", "key"],
            &["GET_SUCCESS", "key", "value", "extra"],
            &["DELETE_ERROR"],
            &["DELETE_ERROR", "msg", "extra"],
        ];
        for case in cases {
            let lines: Vec<String> = case.iter().map(|s| s.to_string()).collect();
            assert!(
                matches!(decode(&lines), Err(Error::Protocol(_))),
                "expected protocol error for {:?}",
                case
            );
        }
    }

    #[test]
    fn decode_put_without_value_requests_delete() {
        let lines = vec!["PUT".to_string(), "foo".to_string()];
        let message = decode(&lines).unwrap();
        assert_eq!(message.status, Status::Put);
        assert_eq!(message.key.as_deref(), Some("foo"));
        assert_eq!(message.value, None);
    }

    #[test]
    fn decode_error_response_has_no_key() {
        let lines = vec!["PUT_ERROR".to_string(), "something broke".to_string()];
        let message = decode(&lines).unwrap();
        assert_eq!(message.key, None);
        assert_eq!(message.value.as_deref(), Some("something broke"));
    }
}
