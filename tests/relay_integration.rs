//! End-to-end tests for the relay pipeline: endpoint resolution, the copy
//! loop and the persistent server, wired together the way the binary
//! wires them.

use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Duration, timeout};

use bytepipe::config::{InputSpec, OutputSpec};
use bytepipe::endpoint::{self, ResolvedInput};
use bytepipe::server::RelayServer;
use bytepipe::shutdown::ShutdownFlag;
use bytepipe::types::{BufferSize, Port};
use bytepipe::{RelayError, relay};

mod helpers;
use helpers::*;

#[tokio::test]
async fn test_file_to_tcp_sink() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"Hello, World!\n")?;

    let (collector_port, collector) = spawn_collector().await;

    let input = endpoint::resolve_input(&InputSpec::File(file.path().to_path_buf())).await?;
    let mut source = match input {
        ResolvedInput::Source(source) => source,
        ResolvedInput::Listener(_) => unreachable!(),
    };
    let mut sink = endpoint::resolve_output(&OutputSpec::Connect {
        address: "127.0.0.1".to_string(),
        port: collector_port,
    })
    .await?;

    let copied = relay::copy(&mut source, &mut sink, BufferSize::DEFAULT).await?;
    assert_eq!(copied, 14);

    drop(sink);
    let collected = timeout(Duration::from_secs(5), collector).await??;
    assert_eq!(collected, b"Hello, World!\n");
    Ok(())
}

#[tokio::test]
async fn test_file_relay_chunking_across_buffer_sizes() -> Result<()> {
    let payload: Vec<u8> = (0..4096u32).map(|i| (i % 256) as u8).collect();
    let mut file = NamedTempFile::new()?;
    file.write_all(&payload)?;

    for buffer_size in [1, 4, 1000, 4096, 16384] {
        let (collector_port, collector) = spawn_collector().await;

        let input = endpoint::resolve_input(&InputSpec::File(file.path().to_path_buf())).await?;
        let mut source = match input {
            ResolvedInput::Source(source) => source,
            ResolvedInput::Listener(_) => unreachable!(),
        };
        let mut sink = endpoint::resolve_output(&OutputSpec::Connect {
            address: "127.0.0.1".to_string(),
            port: collector_port,
        })
        .await?;

        let copied =
            relay::copy(&mut source, &mut sink, BufferSize::new(buffer_size).unwrap()).await?;
        assert_eq!(copied, payload.len() as u64);

        drop(sink);
        let collected = timeout(Duration::from_secs(5), collector).await??;
        assert_eq!(collected, payload, "buffer size {}", buffer_size);
    }
    Ok(())
}

#[tokio::test]
async fn test_server_relays_client_payload() -> Result<()> {
    let (collector_port, collector) = spawn_collector().await;
    let listen_port = find_available_port().await;

    let listener = match endpoint::resolve_input(&InputSpec::Listen {
        address: "127.0.0.1".to_string(),
        port: listen_port,
    })
    .await?
    {
        ResolvedInput::Listener(listener) => listener,
        ResolvedInput::Source(_) => unreachable!(),
    };
    let addr = listener.local_addr()?;

    let sink = endpoint::resolve_output(&OutputSpec::Connect {
        address: "127.0.0.1".to_string(),
        port: collector_port,
    })
    .await?;

    let shutdown = ShutdownFlag::new();
    let server = RelayServer::new(listener, sink, BufferSize::new(4).unwrap(), shutdown.clone());
    let server_handle = tokio::spawn(server.run());

    // Ten bytes through a four-byte buffer: reads of 4, 4, 2
    let mut client = TcpStream::connect(addr).await?;
    client.write_all(b"ABCDEFGHIJ").await?;
    client.shutdown().await?;
    let mut eof = [0u8; 1];
    assert_eq!(client.read(&mut eof).await?, 0);

    shutdown.trigger();
    let total = timeout(Duration::from_secs(5), server_handle).await???;
    assert_eq!(total, 10);

    let collected = timeout(Duration::from_secs(5), collector).await??;
    assert_eq!(collected, b"ABCDEFGHIJ");
    Ok(())
}

#[tokio::test]
async fn test_zero_length_file_yields_zero_length_sink() -> Result<()> {
    let file = NamedTempFile::new()?;
    let (collector_port, collector) = spawn_collector().await;

    let input = endpoint::resolve_input(&InputSpec::File(file.path().to_path_buf())).await?;
    let mut source = match input {
        ResolvedInput::Source(source) => source,
        ResolvedInput::Listener(_) => unreachable!(),
    };
    let mut sink = endpoint::resolve_output(&OutputSpec::Connect {
        address: "127.0.0.1".to_string(),
        port: collector_port,
    })
    .await?;

    let copied = relay::copy(&mut source, &mut sink, BufferSize::DEFAULT).await?;
    assert_eq!(copied, 0);

    drop(sink);
    let collected = timeout(Duration::from_secs(5), collector).await??;
    assert!(collected.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_conflict_detected_before_any_resolution() {
    use bytepipe::Args;
    use clap::Parser;

    // The conflicting listen address points at a port nothing listens on;
    // the config error must surface without ever touching it.
    let args = Args::try_parse_from(["bytepipe", "input.txt", "-i", "10.0.0.1"]).unwrap();
    let err = args.into_config().unwrap_err();
    assert!(matches!(err, RelayError::Config { .. }));
}
