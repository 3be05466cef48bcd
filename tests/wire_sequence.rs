//! Wire-sequence tests: the exact command ordering observed by the server
//! for a single dispatch run.

mod common;

use common::{FakeServer, FakeServerOptions, default_lines, dispatcher, request};

#[tokio::test]
async fn test_default_template_full_sequence() -> anyhow::Result<()> {
    let server = FakeServer::spawn().await?;

    let report = dispatcher().run(&request(vec![server.dest("alpha")])).await?;
    assert_eq!(report.delivered(), 1);

    let conns = server.connections().await;
    assert_eq!(conns.len(), 1);

    let mut expected = vec![
        "NICK bot".to_string(),
        "USER bot bot bot :bot".to_string(),
        "JOIN #alpha".to_string(),
    ];
    expected.extend(default_lines("PRIVMSG", "alpha"));
    expected.push("PART #alpha".to_string());
    expected.push("QUIT".to_string());

    assert_eq!(conns[0], expected);
    Ok(())
}

#[tokio::test]
async fn test_use_notice_swaps_message_command() -> anyhow::Result<()> {
    let server = FakeServer::spawn().await?;

    let mut req = request(vec![server.dest("alpha")]);
    req.use_notice = true;
    dispatcher().run(&req).await?;

    let conns = server.connections().await;
    let mut expected = vec![
        "NICK bot".to_string(),
        "USER bot bot bot :bot".to_string(),
        "JOIN #alpha".to_string(),
    ];
    expected.extend(default_lines("NOTICE", "alpha"));
    expected.push("PART #alpha".to_string());
    expected.push("QUIT".to_string());

    assert_eq!(conns[0], expected);
    Ok(())
}

#[tokio::test]
async fn test_skip_join_removes_join_and_part_only() -> anyhow::Result<()> {
    let server = FakeServer::spawn().await?;

    let mut req = request(vec![server.dest("alpha")]);
    req.skip_join = true;
    dispatcher().run(&req).await?;

    let conns = server.connections().await;
    let mut expected = vec!["NICK bot".to_string(), "USER bot bot bot :bot".to_string()];
    expected.extend(default_lines("PRIVMSG", "alpha"));
    expected.push("QUIT".to_string());

    assert_eq!(conns[0], expected);
    Ok(())
}

#[tokio::test]
async fn test_custom_template_single_line() -> anyhow::Result<()> {
    let server = FakeServer::spawn().await?;

    let mut req = request(vec![server.dest("alpha")]);
    req.template = Some(vec!["%{repository} %{commit}".to_string()]);
    dispatcher().run(&req).await?;

    let conns = server.connections().await;
    assert_eq!(
        conns[0],
        vec![
            "NICK bot",
            "USER bot bot bot :bot",
            "JOIN #alpha",
            "PRIVMSG #alpha :[bot] svenfuchs/minimal 62aae5f",
            "PART #alpha",
            "QUIT",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_custom_template_multiple_lines_in_order() -> anyhow::Result<()> {
    let server = FakeServer::spawn().await?;

    let mut req = request(vec![server.dest("alpha")]);
    req.template = Some(vec![
        "%{repository} %{commit}".to_string(),
        "%{message}".to_string(),
    ]);
    dispatcher().run(&req).await?;

    let conns = server.connections().await;
    assert_eq!(
        conns[0],
        vec![
            "NICK bot",
            "USER bot bot bot :bot",
            "JOIN #alpha",
            "PRIVMSG #alpha :[bot] svenfuchs/minimal 62aae5f",
            "PRIVMSG #alpha :[bot] The build passed.",
            "PART #alpha",
            "QUIT",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_channels_on_same_host_share_one_connection() -> anyhow::Result<()> {
    let server = FakeServer::spawn().await?;

    dispatcher()
        .run(&request(vec![server.dest("alpha"), server.dest("beta")]))
        .await?;

    let conns = server.connections().await;
    assert_eq!(conns.len(), 1, "one socket for two channels on one host");

    // All joins precede the first message, all parts follow the last.
    let mut expected = vec![
        "NICK bot".to_string(),
        "USER bot bot bot :bot".to_string(),
        "JOIN #alpha".to_string(),
        "JOIN #beta".to_string(),
    ];
    expected.extend(default_lines("PRIVMSG", "alpha"));
    expected.extend(default_lines("PRIVMSG", "beta"));
    expected.push("PART #alpha".to_string());
    expected.push("PART #beta".to_string());
    expected.push("QUIT".to_string());

    assert_eq!(conns[0], expected);
    Ok(())
}

#[tokio::test]
async fn test_different_hosts_get_independent_sequences() -> anyhow::Result<()> {
    let first = FakeServer::spawn().await?;
    let second = FakeServer::spawn().await?;

    let report = dispatcher()
        .run(&request(vec![first.dest("alpha"), second.dest("beta")]))
        .await?;
    assert_eq!(report.delivered(), 2);

    for (server, channel) in [(&first, "alpha"), (&second, "beta")] {
        let conns = server.connections().await;
        assert_eq!(conns.len(), 1);
        let mut expected = vec![
            "NICK bot".to_string(),
            "USER bot bot bot :bot".to_string(),
            format!("JOIN #{channel}"),
        ];
        expected.extend(default_lines("PRIVMSG", channel));
        expected.push(format!("PART #{channel}"));
        expected.push("QUIT".to_string());
        assert_eq!(conns[0], expected);
    }
    Ok(())
}

#[tokio::test]
async fn test_ping_gets_exactly_one_verbatim_pong() -> anyhow::Result<()> {
    let server = FakeServer::spawn_with(FakeServerOptions {
        ping_on_connect: Some(":fake.test".to_string()),
        ..FakeServerOptions::default()
    })
    .await?;

    dispatcher().run(&request(vec![server.dest("alpha")])).await?;

    let conns = server.connections().await;
    let pongs: Vec<_> = conns[0].iter().filter(|l| l.starts_with("PONG")).collect();
    assert_eq!(pongs, vec!["PONG :fake.test"]);

    // The PONG interleaves without disturbing the main sequence.
    let without_pong: Vec<_> = conns[0]
        .iter()
        .filter(|l| !l.starts_with("PONG"))
        .cloned()
        .collect();
    let mut expected = vec![
        "NICK bot".to_string(),
        "USER bot bot bot :bot".to_string(),
        "JOIN #alpha".to_string(),
    ];
    expected.extend(default_lines("PRIVMSG", "alpha"));
    expected.push("PART #alpha".to_string());
    expected.push("QUIT".to_string());
    assert_eq!(without_pong, expected);
    Ok(())
}

#[tokio::test]
async fn test_password_sends_pass_before_nick() -> anyhow::Result<()> {
    let server = FakeServer::spawn().await?;

    let mut dest = server.dest("alpha");
    dest.target.password = Some("hunter2".to_string());
    dispatcher().run(&request(vec![dest])).await?;

    let conns = server.connections().await;
    assert_eq!(conns[0][0], "PASS hunter2");
    assert_eq!(conns[0][1], "NICK bot");
    assert_eq!(conns[0][2], "USER bot bot bot :bot");
    Ok(())
}

#[tokio::test]
async fn test_join_key_appears_on_the_wire() -> anyhow::Result<()> {
    let server = FakeServer::spawn().await?;

    let mut dest = server.dest("ops");
    dest.key = Some("sekrit".to_string());
    dispatcher().run(&request(vec![dest])).await?;

    let conns = server.connections().await;
    assert!(conns[0].contains(&"JOIN #ops sekrit".to_string()));
    Ok(())
}
