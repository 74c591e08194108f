//! # Thin Block Flows
//!
//! Peers announce a block as a stub, the receiving node resolves what it
//! can from its pool and downloads the rest.
//!
//! ## Flows Tested:
//!
//! 1. **Single peer**: stub with prefilled and pooled transactions, one download
//! 2. **Racing peers**: two peers deliver the same block into one reconstruction
//! 3. **Encodings**: bloom thin, xthin and compact stubs against the same pool
//! 4. **Failure paths**: collisions, re-request fallback, disconnects

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use qc_05_thin_blocks::adapters::{
        BloomThinStub, CompactStub, PoolTxFinder, StubParams, XThinStub,
    };
    use qc_05_thin_blocks::{
        InvKind, Inventory, OutboundMessage, PeerConnection, PeerId, StubData, ThinBlockConfig,
        ThinBlockError, ThinBlockManager, ThinBlockMode, ThinBlockWorker, ThinTx, TxFinder,
    };
    use quantum_telemetry::{init_test_tracing, init_tracing, TelemetryConfig, TelemetryError};
    use rand::Rng;
    use shared_types::{BlockHeader, Transaction};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn create_test_transaction(nonce: u64) -> Transaction {
        Transaction {
            from: [0xAA; 32],
            to: Some([0xBB; 32]),
            value: 1_000_000,
            nonce,
            data: vec![],
            signature: [0u8; 64],
        }
    }

    fn create_test_block(height: u64, tx_count: u64) -> (BlockHeader, Vec<Transaction>) {
        let header = BlockHeader {
            version: 1,
            height,
            parent_hash: [0x11; 32],
            merkle_root: [0x22; 32],
            timestamp: 1_700_000_000 + height,
            proposer: [0x33; 32],
        };
        let txs = (0..tx_count)
            .map(|i| create_test_transaction(height * 1_000 + i))
            .collect();
        (header, txs)
    }

    /// Records everything sent to the peer.
    struct MockPeer {
        id: PeerId,
        sent: Vec<OutboundMessage>,
    }

    impl MockPeer {
        fn new(id: u64) -> Self {
            Self {
                id: PeerId::new(id),
                sent: Vec::new(),
            }
        }
    }

    impl PeerConnection for MockPeer {
        fn peer_id(&self) -> PeerId {
            self.id
        }
        fn send(&mut self, message: OutboundMessage) {
            self.sent.push(message);
        }
    }

    // =============================================================================
    // TELEMETRY
    // =============================================================================

    #[test]
    fn test_relay_telemetry_config() {
        init_test_tracing();
        let config = TelemetryConfig::for_subsystem("05", "thin-blocks");
        assert_eq!(config.service_name, "qc-05-thin-blocks");
        assert_eq!(config.subsystem_id, "05");

        // The test subscriber is already global, so a second install is refused
        let err = init_tracing(&TelemetryConfig {
            log_level: "info".to_string(),
            ..config
        })
        .unwrap_err();
        assert!(matches!(err, TelemetryError::SubscriberInit(_)), "{err}");
    }

    // =============================================================================
    // SINGLE PEER
    // =============================================================================

    /// Five transactions: two prefilled, two in the pool, one downloaded.
    #[test]
    fn test_stub_resolves_prefilled_and_pooled() {
        init_test_tracing();
        let mg = Arc::new(ThinBlockManager::default());
        let (header, txs) = create_test_block(1, 5);
        let pool: PoolTxFinder = [txs[2].clone(), txs[3].clone()].into_iter().collect();
        let stub = XThinStub::from_transactions(StubParams {
            header: &header,
            transactions: &txs,
            prefill_indices: &[0, 1],
        });

        let mut worker = ThinBlockWorker::new(mg.clone(), PeerId::new(1));
        worker.set_to_work(header.hash());
        worker.build_stub(&stub, &pool).unwrap();
        assert!(worker.is_stub_built());

        let missing = worker.get_txs_missing();
        assert_eq!(missing.len(), 1);
        assert!(missing[0].equals_hash(&txs[4].hash()).is_equal());

        assert!(worker.add_tx(&txs[4]));
        assert!(worker.get_txs_missing().is_empty());

        let block = mg.take_finished(&header.hash()).unwrap();
        assert_eq!(block.header, header);
        assert_eq!(block.transactions, txs);

        worker.set_available();
        assert_eq!(mg.tracked_blocks(), 0);
    }

    // =============================================================================
    // RACING PEERS
    // =============================================================================

    #[test]
    fn test_two_peers_share_one_reconstruction() {
        init_test_tracing();
        let mg = Arc::new(ThinBlockManager::default());
        let (header, txs) = create_test_block(2, 4);
        let block = header.hash();
        let empty_pool = PoolTxFinder::new();

        let mut w7 = ThinBlockWorker::new(mg.clone(), PeerId::new(7));
        let mut w8 = ThinBlockWorker::new(mg.clone(), PeerId::new(8));
        w7.set_to_work(block);
        w8.set_to_work(block);
        assert!(!w7.is_only_worker());
        assert_eq!(mg.num_workers(&block), 2);

        let params = StubParams {
            header: &header,
            transactions: &txs,
            prefill_indices: &[],
        };
        w7.build_stub(&BloomThinStub::from_transactions(params), &empty_pool)
            .unwrap();
        assert!(w8.is_stub_built(), "stub built by peer 7 is visible to peer 8");

        // Peer 8's own stub arrives late and must not reset progress
        assert!(w7.add_tx(&txs[0]));
        w8.build_stub(&CompactStub::from_transactions(params, 5), &empty_pool)
            .unwrap();
        assert_eq!(w8.get_txs_missing().len(), 3);

        // Same transaction from both peers counts once
        assert!(w8.add_tx(&txs[1]));
        assert!(!w7.add_tx(&txs[1]));

        assert!(w7.add_tx(&txs[2]));
        assert!(w8.add_tx(&txs[3]));
        assert!(w7.get_txs_missing().is_empty());
        assert!(mg.is_finished(&block));

        drop(w8);
        assert!(w7.is_only_worker());
        assert_eq!(mg.take_finished(&block).unwrap().transactions, txs);
    }

    #[test]
    fn test_disconnect_of_last_peer_drops_progress() {
        let mg = Arc::new(ThinBlockManager::default());
        let (header, txs) = create_test_block(3, 3);
        let block = header.hash();
        let stub = XThinStub::from_transactions(StubParams {
            header: &header,
            transactions: &txs,
            prefill_indices: &[0],
        });

        {
            let mut worker = ThinBlockWorker::new(mg.clone(), PeerId::new(1));
            worker.set_to_work(block);
            worker.build_stub(&stub, &PoolTxFinder::new()).unwrap();
            assert_eq!(worker.get_txs_missing().len(), 2);
        }

        assert!(!mg.is_stub_built(&block));
        assert!(mg.get_txs_missing(&block).is_empty());
        assert_eq!(mg.tracked_blocks(), 0);

        // A new peer starts from scratch
        let mut worker = ThinBlockWorker::new(mg.clone(), PeerId::new(2));
        worker.set_to_work(block);
        assert!(!worker.is_stub_built());
    }

    // =============================================================================
    // ENCODINGS
    // =============================================================================

    #[test]
    fn test_every_encoding_reconstructs_from_pool() {
        init_test_tracing();
        let (header, txs) = create_test_block(4, 20);
        let pool: PoolTxFinder = txs.iter().skip(1).cloned().collect();
        let params = StubParams {
            header: &header,
            transactions: &txs,
            prefill_indices: &[0],
        };

        let bloom: Box<dyn StubData> = Box::new(BloomThinStub::from_transactions(params));
        let xthin: Box<dyn StubData> = Box::new(XThinStub::from_transactions(params));
        let compact: Box<dyn StubData> = Box::new(CompactStub::from_transactions(params, 0xDEAD));
        let stubs = [
            (ThinBlockMode::BloomThin, bloom),
            (ThinBlockMode::XThin, xthin),
            (ThinBlockMode::Compact, compact),
        ];

        for (mode, stub) in stubs {
            let mg = Arc::new(ThinBlockManager::default());
            let mut worker = ThinBlockWorker::with_mode(mg.clone(), PeerId::new(1), mode);
            worker.set_to_work(header.hash());
            worker.build_stub(stub.as_ref(), &pool).unwrap();

            assert!(worker.get_txs_missing().is_empty(), "{mode} left transactions missing");
            let block = mg.take_finished(&header.hash()).unwrap();
            assert_eq!(block.transactions, txs, "{mode} reordered transactions");
        }
    }

    #[test]
    fn test_missing_ids_learn_full_hash_on_delivery() {
        let mg = Arc::new(ThinBlockManager::default());
        let (header, txs) = create_test_block(5, 3);
        let stub = CompactStub::from_transactions(
            StubParams {
                header: &header,
                transactions: &txs,
                prefill_indices: &[],
            },
            9,
        );
        let (k0, k1) = stub.salts();

        let mut worker = ThinBlockWorker::new(mg.clone(), PeerId::new(1));
        worker.set_to_work(header.hash());
        worker.build_stub(&stub, &PoolTxFinder::new()).unwrap();

        let missing = worker.get_txs_missing();
        assert!(missing.iter().all(|id| !id.has_full() && id.has_obfuscated()));
        assert_eq!(missing[0].obfuscated_id().map(|o| (o.idk0, o.idk1)), Some((k0, k1)));

        // Same short id under other salts tells us nothing
        let foreign = ThinTx::from_obfuscated(stub.short_ids[0], k0 ^ 1, k1);
        assert!(missing[0].equals(&foreign).is_indeterminate());

        assert!(worker.add_tx(&txs[1]));
        assert_eq!(worker.get_txs_missing().len(), 2);
    }

    #[test]
    fn test_closure_finder() {
        let mg = Arc::new(ThinBlockManager::default());
        let (header, txs) = create_test_block(6, 6);
        let stub = BloomThinStub::from_transactions(StubParams {
            header: &header,
            transactions: &txs,
            prefill_indices: &[],
        });
        let even_only = |id: &ThinTx| {
            txs.iter()
                .filter(|t| t.nonce % 2 == 0)
                .find(|t| id.equals_hash(&t.hash()).is_equal())
                .cloned()
        };
        assert!(even_only.find(&ThinTx::from_full(txs[0].hash())).is_some());

        let mut worker = ThinBlockWorker::new(mg, PeerId::new(1));
        worker.set_to_work(header.hash());
        worker.build_stub(&stub, &even_only).unwrap();
        assert_eq!(worker.get_txs_missing().len(), 3);
    }

    // =============================================================================
    // FAILURE PATHS
    // =============================================================================

    #[test]
    fn test_cheap_hash_collision_rejected() {
        let mg = Arc::new(ThinBlockManager::default());
        let (header, txs) = create_test_block(7, 3);
        let mut stub = XThinStub::from_transactions(StubParams {
            header: &header,
            transactions: &txs,
            prefill_indices: &[],
        });
        stub.cheap_hashes[2] = stub.cheap_hashes[0];

        let mut worker = ThinBlockWorker::new(mg.clone(), PeerId::new(1));
        worker.set_to_work(header.hash());
        assert_eq!(
            worker.build_stub(&stub, &PoolTxFinder::new()),
            Err(ThinBlockError::Collision {
                block: header.hash(),
                first: 0,
                second: 2,
            })
        );
        assert!(!worker.is_stub_built());
        assert!(worker.get_txs_missing().is_empty());
    }

    #[test]
    fn test_oversized_stub_rejected() {
        let mg = Arc::new(ThinBlockManager::new(ThinBlockConfig {
            max_stub_transactions: 8,
            ..Default::default()
        }));
        let (header, txs) = create_test_block(8, 9);
        let stub = BloomThinStub::from_transactions(StubParams {
            header: &header,
            transactions: &txs,
            prefill_indices: &[],
        });

        let mut worker = ThinBlockWorker::new(mg, PeerId::new(1));
        worker.set_to_work(header.hash());
        let err = worker.build_stub(&stub, &PoolTxFinder::new()).unwrap_err();
        assert_eq!(err, ThinBlockError::TooManyTransactions { count: 9, max: 8 });
    }

    /// The supervisor flips a stuck worker into re-requesting mode once the
    /// configured delay has passed; the next request asks for the full block.
    #[test]
    fn test_stalled_worker_falls_back_to_full_block() {
        let config = ThinBlockConfig {
            preferred_mode: ThinBlockMode::XThin,
            rerequest_after: Duration::from_millis(200),
            stall_timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let mg = Arc::new(ThinBlockManager::new(config));
        let (header, txs) = create_test_block(9, 2);
        let block = header.hash();
        let mut peer = MockPeer::new(3);
        let mut get_data = Vec::new();

        let mut worker = ThinBlockWorker::new(mg.clone(), peer.peer_id());
        worker.set_to_work(block);
        worker.request_block(block, &mut get_data, &mut peer);
        assert_eq!(peer.sent, vec![OutboundMessage::GetXThin { block_hash: block }]);
        assert!(get_data.is_empty());

        let stub = XThinStub::from_transactions(StubParams {
            header: &header,
            transactions: &txs,
            prefill_indices: &[],
        });
        worker.build_stub(&stub, &PoolTxFinder::new()).unwrap();

        let waited = Duration::from_millis(250);
        assert!(!mg.config().is_stalled(waited));
        if mg.config().should_rerequest(waited) && !worker.get_txs_missing().is_empty() {
            worker.set_re_requesting(true);
        }
        assert!(worker.is_re_requesting());

        worker.request_block(block, &mut get_data, &mut peer);
        assert_eq!(get_data, vec![Inventory::new(InvKind::Block, block)]);
        assert_eq!(peer.sent.len(), 1);

        worker.flush_requests(&mut get_data, &mut peer);
        assert!(get_data.is_empty());
        assert_eq!(
            peer.sent.last(),
            Some(&OutboundMessage::GetData(vec![Inventory::new(InvKind::Block, block)]))
        );

        assert!(mg.config().is_stalled(Duration::from_secs(3)));
        worker.set_available();
        assert!(!worker.is_re_requesting());
        assert_eq!(mg.num_workers(&block), 0);
    }

    #[test]
    fn test_random_delivery_order() {
        let mut rng = rand::thread_rng();
        let mg = Arc::new(ThinBlockManager::default());
        let (header, txs) = create_test_block(10, 32);
        let stub = CompactStub::from_transactions(
            StubParams {
                header: &header,
                transactions: &txs,
                prefill_indices: &[0],
            },
            rng.gen(),
        );

        let workers: Vec<ThinBlockWorker> = (0..3)
            .map(|p| {
                let mut w = ThinBlockWorker::new(mg.clone(), PeerId::new(p));
                w.set_to_work(header.hash());
                w
            })
            .collect();
        workers[0].build_stub(&stub, &PoolTxFinder::new()).unwrap();

        let mut pending: Vec<&Transaction> = txs.iter().skip(1).collect();
        let mut accepted = 0;
        while !pending.is_empty() {
            let tx = pending.swap_remove(rng.gen_range(0..pending.len()));
            let worker = &workers[rng.gen_range(0..workers.len())];
            if worker.add_tx(tx) {
                accepted += 1;
            }
            // Duplicate from another peer
            assert!(!workers[0].add_tx(tx));
        }

        assert_eq!(accepted, txs.len() - 1);
        assert_eq!(mg.take_finished(&header.hash()).unwrap().transactions, txs);
    }
}
