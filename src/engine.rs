//! The Authentication engine: ties the bit codec, DSM reassembler, TESLA
//! key-chain and navigation-data store together into a per-subframe
//! processing pipeline.
//!
//! [`Engine`] is the only type a caller needs to drive: feed it subframes in
//! GST order as they are demodulated, and it reports every authentication
//! attempt (and every recoverable error) through the [`Sink`] it was built
//! with.

use std::collections::BTreeMap;

use crate::bitfields::{
    Adkd, ChainAndPubkeyStatus, DsmHeader, DsmKroot, DsmPkr, DsmType, EcdsaFunction, Mack,
    NewPublicKeyType, NmaHeader, NmaStatus, Prnd,
};
use crate::dsm::CollectDsm;
use crate::merkle_tree::MerkleTree;
use crate::navdata::{NavDataStore, CONSTELLATION_PRND};
use crate::pubkey::PublicKey;
use crate::report::{AuthAttempt, Event, Outcome, Sink};
use crate::subframe::{Subframe, SubframeError};
use crate::tesla::Key;
use crate::types::{BitVec, DsmBlock, MackMessage};
use crate::validation::Validated;
use crate::{Gst, Svn};

const SECONDS_PER_WEEK: i64 = 7 * 24 * 3600;

/// Static material an [`Engine`] is configured with: the ECDSA public key
/// trusted to sign KROOT messages, and the Merkle tree root trusted to
/// authenticate renewed public keys.
pub struct Config {
    pubkey: PublicKey<Validated>,
    merkle_tree: MerkleTree,
    initial_chain_id: Option<u8>,
}

impl Config {
    /// Builds a configuration from the current public key and Merkle root.
    pub fn new(pubkey: PublicKey<Validated>, merkle_tree: MerkleTree) -> Config {
        Config {
            pubkey,
            merkle_tree,
            initial_chain_id: None,
        }
    }

    /// Restricts the engine to a known chain ID, rejecting KROOTs for any
    /// other chain until an end-of-chain/chain-revoked transition occurs.
    ///
    /// Not required: the engine otherwise adopts the chain ID of the first
    /// KROOT it validates.
    pub fn with_initial_chain_id(mut self, chain_id: u8) -> Config {
        self.initial_chain_id = Some(chain_id);
        self
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ReceiverState {
    Initializing,
    ReadyToAuthenticate,
}

#[derive(Clone)]
struct PendingSubframe {
    gst: Gst,
    svn: Svn,
    mack: MackMessage,
}

#[derive(Clone)]
enum CollectedTag {
    Tag0 {
        tag: BitVec,
        prna: Svn,
    },
    Tag {
        tag: BitVec,
        prna: Svn,
        ctr: u8,
        prnd_for_mac: u8,
    },
}

/// The OSNMA Authentication engine.
///
/// Owns the DSM reassembler, the current TESLA key chain, the pending-tag
/// store and the navigation-data store, and drives the receiver's CPKS state
/// machine. Construct with [`Engine::new`] and feed it subframes, in GST
/// order, through [`Engine::process_subframe`].
pub struct Engine {
    sink: Box<dyn Sink>,
    pubkey: PublicKey<Validated>,
    merkle_tree: MerkleTree,
    state: ReceiverState,
    current_nma_header: Option<NmaHeader>,
    verified_nma_header: Option<NmaHeader<Validated>>,
    current_cid: Option<u8>,
    eoc_coming: bool,
    dsm: CollectDsm,
    stashed_kroot: Option<(NmaHeader, Vec<u8>)>,
    stashed_pkr: Option<Vec<u8>>,
    root_key: Option<Key<Validated>>,
    newest_key: Option<Key<Validated>>,
    navdata: NavDataStore,
    collected_tags: BTreeMap<(Gst, u8, Adkd), Vec<CollectedTag>>,
    pending: Option<PendingSubframe>,
}

impl Engine {
    /// Builds a fresh engine, not yet authenticating anything, reporting
    /// events to `sink`.
    pub fn new(config: Config, sink: Box<dyn Sink>) -> Engine {
        Engine {
            sink,
            pubkey: config.pubkey,
            merkle_tree: config.merkle_tree,
            state: ReceiverState::Initializing,
            current_nma_header: None,
            verified_nma_header: None,
            current_cid: config.initial_chain_id,
            eoc_coming: false,
            dsm: CollectDsm::new(),
            stashed_kroot: None,
            stashed_pkr: None,
            root_key: None,
            newest_key: None,
            navdata: NavDataStore::new(),
            collected_tags: BTreeMap::new(),
            pending: None,
        }
    }

    /// Warm-starts the engine with a key already validated in a prior run
    /// (for instance, one obtained from [`Engine::newest_key`] and persisted
    /// across a restart).
    ///
    /// Skips the KROOT wait: the engine moves straight to
    /// `ReadyToAuthenticate` using `key`'s chain.
    pub fn inject_key(&mut self, key: Key<Validated>) {
        self.current_cid = Some(key.chain().chain_id());
        self.root_key = Some(key);
        self.newest_key = Some(key);
        self.state = ReceiverState::ReadyToAuthenticate;
    }

    /// The oldest key validated directly from a KROOT, if any chain has been
    /// adopted yet.
    pub fn root_key(&self) -> Option<Key<Validated>> {
        self.root_key
    }

    /// The most recently disclosed and chain-verified key, if any.
    pub fn newest_key(&self) -> Option<Key<Validated>> {
        self.newest_key
    }

    /// Reports whether the engine has a validated key chain and is
    /// authenticating tags.
    pub fn is_ready(&self) -> bool {
        self.state == ReceiverState::ReadyToAuthenticate
    }

    /// Feeds one I/NAV subframe into the engine.
    ///
    /// `subframe` must be the next one, in GST order, for its satellite;
    /// the engine does not reorder subframes it is given out of order.
    pub fn process_subframe(&mut self, subframe: &Subframe) {
        let mut attempts = Vec::new();

        match subframe.hkroot_mack() {
            Err(SubframeError::NoOsnmaData) => {
                self.navdata.extract_subframe_no_timing(subframe);
                log::warn!("no OSNMA bits in subframe at {:?}", subframe.gst());
                self.sink
                    .dispatch(Event::Exception("no OSNMA bits available".into()));
            }
            Ok((hkroot, mack_bytes)) => {
                self.navdata.extract_subframe(subframe);
                self.pending = Some(PendingSubframe {
                    gst: subframe.gst(),
                    svn: subframe.svn(),
                    mack: mack_bytes,
                });

                let nma_header = NmaHeader::new(hkroot[0]);
                if nma_header.is_valid() {
                    let dsm_header_byte = [hkroot[1]];
                    let dsm_header = DsmHeader(&dsm_header_byte);
                    let block: DsmBlock = hkroot[2..15].try_into().unwrap();
                    match self.dsm.feed(dsm_header, &block) {
                        Ok(Some(dsm)) => {
                            let dsm_id = dsm.id();
                            let dsm_data = dsm.data().to_vec();
                            self.handle_dsm_complete(nma_header, dsm_id, dsm_data);
                        }
                        Ok(None) => {}
                        Err(e) => {
                            log::warn!("DSM reassembly error at {:?}: {e}", subframe.gst());
                            self.sink
                                .dispatch(Event::Exception(format!("DSM reassembly error: {e}")));
                        }
                    }
                } else {
                    log::warn!("reserved NMA header value at {:?}", subframe.gst());
                    self.sink
                        .dispatch(Event::Exception("reserved NMA header field".into()));
                }

                if self.state == ReceiverState::ReadyToAuthenticate {
                    if nma_header.is_valid() {
                        self.current_nma_header = Some(nma_header);
                    }
                    if let Some(pending) = self.pending.take() {
                        self.process_pending(pending);
                    }
                    attempts = self.authenticate();
                    if attempts.iter().any(|a| a.outcome.is_ok()) {
                        if let Some(nma) = self.current_nma_header {
                            self.verified_nma_header = Some(nma.force_valid());
                            self.handle_cpks(nma);
                        }
                    }
                }
            }
        }

        self.pending = None;
        self.sink.dispatch(Event::SubframeReport(attempts));
    }

    fn process_pending(&mut self, pending: PendingSubframe) {
        let Some(active_key) = self.newest_key else {
            return;
        };
        let chain = *active_key.chain();
        let mack = Mack::new(&pending.mack, chain.key_size_bits(), chain.tag_size_bits());

        match mack.validate(&active_key, pending.svn, pending.gst) {
            Ok(validated) => self.collect_tags(&validated, pending.gst, pending.svn),
            Err(e) => {
                log::warn!("tag list structural check failed at {:?}: {e}", pending.gst);
                self.sink.dispatch(Event::Exception(format!(
                    "tag list structural check failed: {e}"
                )));
            }
        }

        let disclosed = Key::from_bitslice(mack.key(), pending.gst, &chain);
        match active_key.validate_key(&disclosed) {
            Ok(validated) => {
                log::info!("TESLA key chain-verified at {:?}", pending.gst);
                self.newest_key = Some(validated);
            }
            Err(e) => {
                log::warn!("TESLA key chain verification failed at {:?}: {e}", pending.gst);
                self.sink.dispatch(Event::Exception(format!(
                    "key chain verification failed: {e}"
                )));
            }
        }
    }

    fn collect_tags(&mut self, mack: &Mack<Validated>, gst: Gst, prna: Svn) {
        self.collected_tags
            .entry((gst, u8::from(prna), Adkd::InavCed))
            .or_default()
            .push(CollectedTag::Tag0 {
                tag: mack.tag0().to_bitvec(),
                prna,
            });

        for n in 1..mack.num_tags() {
            let info = mack.tag_and_info(n);
            let adkd = info.adkd();
            let (key_prnd, hmac_prnd) = match info.prnd() {
                Prnd::GalileoSvid(v) => (v, v),
                Prnd::GalileoConstellation => (CONSTELLATION_PRND, u8::from(prna)),
                // mack.validate() above already rejected any reserved PRND.
                Prnd::Reserved => continue,
            };
            self.collected_tags
                .entry((gst, key_prnd, adkd))
                .or_default()
                .push(CollectedTag::Tag {
                    tag: info.tag().to_bitvec(),
                    prna,
                    ctr: (n + 1) as u8,
                    prnd_for_mac: hmac_prnd,
                });
        }
    }

    fn authenticate(&mut self) -> Vec<AuthAttempt> {
        let mut attempts = Vec::new();
        let Some(newest) = self.newest_key else {
            return attempts;
        };
        let mut resolved = Vec::new();

        for (&(tag_gst, prnd, adkd), tags) in &self.collected_tags {
            let navdata_gst = tag_gst.add_seconds(-i64::from(crate::types::SECONDS_PER_SUBFRAME));
            let Some(entry) = self.navdata.lookup(navdata_gst, prnd, adkd) else {
                resolved.push((tag_gst, prnd, adkd));
                continue;
            };

            let dt = gst_seconds_diff(newest.gst_subframe(), tag_gst);
            let Some(past_key) = past_key_for(&newest, adkd, dt) else {
                continue;
            };

            for tag in tags {
                let (matched, prna) = match tag {
                    CollectedTag::Tag0 { tag, prna } => {
                        (past_key.validate_tag0(tag, tag_gst, *prna, &entry.bits), *prna)
                    }
                    CollectedTag::Tag {
                        tag,
                        prna,
                        ctr,
                        prnd_for_mac,
                    } => (
                        past_key.validate_tag(tag, tag_gst, *prnd_for_mac, *prna, *ctr, &entry.bits),
                        *prna,
                    ),
                };
                let outcome =
                    Outcome::from_flags(matched, entry.old_nav_data_used, entry.incomplete_subframe);
                if matched {
                    log::info!("authenticated tag for {adkd:?} at {tag_gst:?}");
                } else {
                    log::error!("tag mismatch for {adkd:?} at {tag_gst:?}");
                }
                attempts.push(AuthAttempt {
                    prnd: (adkd != Adkd::InavTiming).then_some(prnd),
                    prna,
                    wn: tag_gst.wn(),
                    tow: tag_gst.tow(),
                    adkd,
                    outcome,
                });
            }

            self.navdata.remove(navdata_gst, prnd, adkd);
            resolved.push((tag_gst, prnd, adkd));
        }

        for key in resolved {
            self.collected_tags.remove(&key);
        }
        attempts
    }

    fn handle_dsm_complete(&mut self, nma_header: NmaHeader, dsm_id: u8, dsm_data: Vec<u8>) {
        let dsm_type = if dsm_id >= 12 { DsmType::Pkr } else { DsmType::Kroot };
        match dsm_type {
            DsmType::Kroot => {
                if self.eoc_coming {
                    log::info!(
                        "stashing KROOT for chain {} ahead of rollover",
                        nma_header.chain_id()
                    );
                    self.stashed_kroot = Some((nma_header, dsm_data));
                    return;
                }
                if self.state == ReceiverState::ReadyToAuthenticate {
                    log::debug!("KROOT retransmission while already active; ignoring");
                    return;
                }
                self.adopt_kroot(nma_header, &dsm_data);
            }
            DsmType::Pkr => {
                log::debug!("stashing completed PKR for CPKS handler");
                self.stashed_pkr = Some(dsm_data);
            }
        }
    }

    fn adopt_kroot(&mut self, nma_header: NmaHeader, dsm_data: &[u8]) {
        match Key::from_dsm_kroot(nma_header, DsmKroot(dsm_data), &self.pubkey) {
            Ok(key) => {
                log::info!(
                    "KROOT validated for chain {}, entering ready state",
                    nma_header.chain_id()
                );
                self.current_cid = Some(nma_header.chain_id());
                self.root_key = Some(key);
                self.newest_key = Some(key);
                self.state = ReceiverState::ReadyToAuthenticate;
            }
            Err(e) => {
                log::error!("KROOT validation failed: {e}");
                self.sink
                    .dispatch(Event::Exception(format!("KROOT validation failed: {e}")));
            }
        }
    }

    fn handle_cpks(&mut self, nma_header: NmaHeader<Validated>) {
        match nma_header.chain_and_pubkey_status() {
            ChainAndPubkeyStatus::Reserved | ChainAndPubkeyStatus::Nominal => {}
            ChainAndPubkeyStatus::EndOfChain => {
                if !self.eoc_coming {
                    log::info!("end-of-chain signalled for chain {}", nma_header.chain_id());
                }
                self.eoc_coming = true;
            }
            ChainAndPubkeyStatus::ChainRevoked => match nma_header.nma_status() {
                NmaStatus::DontUse => {
                    log::warn!("chain revoked and marked don't-use; reinitializing");
                    self.reset_to_initializing();
                }
                NmaStatus::Operational => self.jump_to_next_chain(),
                NmaStatus::Test | NmaStatus::Reserved => {}
            },
            ChainAndPubkeyStatus::NewPublicKey => self.apply_stashed_pkr(),
            ChainAndPubkeyStatus::PublicKeyRevoked => match nma_header.nma_status() {
                NmaStatus::DontUse => self.reset_to_initializing(),
                NmaStatus::Operational => self.apply_stashed_pkr(),
                NmaStatus::Test | NmaStatus::Reserved => {}
            },
        }
    }

    fn jump_to_next_chain(&mut self) {
        let Some((nma_header, dsm_data)) = self.stashed_kroot.take() else {
            log::warn!("chain revoked but no stashed KROOT available; reinitializing");
            self.reset_to_initializing();
            return;
        };
        self.eoc_coming = false;
        self.adopt_kroot(nma_header, &dsm_data);
        if !matches!(self.state, ReceiverState::ReadyToAuthenticate) {
            self.reset_to_initializing();
        }
    }

    fn apply_stashed_pkr(&mut self) {
        let Some(dsm_data) = self.stashed_pkr.take() else {
            log::warn!("new/revoked public key event but no stashed PKR available");
            return;
        };
        let dsm_pkr = DsmPkr(&dsm_data);
        match self.merkle_tree.validate_pkr(dsm_pkr) {
            Ok(()) => match build_public_key(&dsm_pkr) {
                Some(pubkey) => {
                    log::info!("adopted renewed public key, id={}", pubkey.public_key_id());
                    self.pubkey = pubkey;
                }
                None => log::error!("stashed PKR merkle-verified but key material unparsable"),
            },
            Err(e) => {
                log::error!("stashed PKR failed merkle verification: {e}");
                self.sink
                    .dispatch(Event::Exception(format!("stashed PKR invalid: {e}")));
            }
        }
    }

    fn reset_to_initializing(&mut self) {
        self.state = ReceiverState::Initializing;
        self.current_cid = None;
        self.eoc_coming = false;
        self.root_key = None;
        self.newest_key = None;
        self.verified_nma_header = None;
        self.collected_tags.clear();
    }
}

fn build_public_key(dsm_pkr: &DsmPkr) -> Option<PublicKey<Validated>> {
    let key_bytes = dsm_pkr.new_public_key()?;
    let id = dsm_pkr.new_public_key_id();
    match dsm_pkr.new_public_key_type() {
        NewPublicKeyType::EcdsaKey(EcdsaFunction::P256Sha256) => {
            let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes).ok()?;
            Some(PublicKey::from_p256(key, id).force_valid())
        }
        #[cfg(feature = "p521")]
        NewPublicKeyType::EcdsaKey(EcdsaFunction::P521Sha512) => {
            let key = p521::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes).ok()?;
            Some(PublicKey::from_p521(key, id).force_valid())
        }
        _ => None,
    }
}

/// `a - b`, in seconds, accounting for week rollover.
fn gst_seconds_diff(a: Gst, b: Gst) -> i64 {
    (i64::from(a.wn()) - i64::from(b.wn())) * SECONDS_PER_WEEK + i64::from(a.tow())
        - i64::from(b.tow())
}

/// Derives the key that should have authenticated a tag transmitted at
/// `tag_gst`, given the newest verified key and its GST, or `None` if that
/// key has not been disclosed yet.
fn past_key_for(newest: &Key<Validated>, adkd: Adkd, dt: i64) -> Option<Key<Validated>> {
    if dt <= 0 || dt % 30 != 0 {
        return None;
    }
    if adkd == Adkd::SlowMac {
        if dt < 11 * 30 {
            return None;
        }
        Some(newest.derive(((dt - 11 * 30) / 30) as usize))
    } else {
        Some(newest.derive((dt / 30 - 1) as usize))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tesla::Chain;
    use hex_literal::hex;

    // DSM-KROOT broadcast on 2022-03-07 9:00 UTC, reused from the bit-field
    // decoding tests; chain id 1, SHA-256/HMAC-SHA-256, 128-bit key, 40-bit
    // tags, MACLT 0x21.
    fn test_chain() -> Chain {
        let dsm = hex!(
            "22 50 49 21 04 98 21 25 d3 96 4d a3 a2 84 1e 1d
             e4 d4 58 c0 e9 84 24 76 e0 04 66 6c f3 79 58 de
             28 51 97 a2 63 53 f1 a4 c6 6d 7e 3d 29 18 53 ba
             5a 13 c9 c3 48 4a 26 77 70 11 2a 13 38 3e a5 2d
             3a 01 9d 5b 6e 1d d1 87 b9 45 3c df 06 ca 7f 34
             ea 14 97 52 5a af 18 f1 f9 f1 fc cb 12 29 89 77
             35 c0 21 b0 41 73 93 b5"
        );
        let nma_header = NmaHeader::new(0x52);
        Chain::from_dsm_kroot(nma_header, DsmKroot(&dsm)).unwrap()
    }

    fn test_key(data: &[u8], gst: Gst) -> Key<Validated> {
        Key::from_slice(data, gst, &test_chain()).force_valid()
    }

    #[test]
    fn gst_diff_same_week() {
        let a = Gst::new(1177, 200);
        let b = Gst::new(1177, 170);
        assert_eq!(gst_seconds_diff(a, b), 30);
        assert_eq!(gst_seconds_diff(b, a), -30);
    }

    #[test]
    fn gst_diff_across_week_rollover() {
        let a = Gst::new(1178, 0);
        let b = Gst::new(1177, SECONDS_PER_WEEK as u32 - 30);
        assert_eq!(gst_seconds_diff(a, b), 30);
    }

    #[test]
    fn past_key_rejects_non_positive_or_non_multiple_of_thirty() {
        let key = test_key(
            &hex!("42 b4 19 da 6a da 1c 0a 3d 6f 56 a5 e5 dc 59 a7"),
            Gst::new(1176, 120930),
        );
        assert!(past_key_for(&key, Adkd::InavCed, 29).is_none());
        assert!(past_key_for(&key, Adkd::InavCed, 0).is_none());
        assert!(past_key_for(&key, Adkd::InavCed, -30).is_none());
    }

    #[test]
    fn past_key_ced_zero_derivations_at_one_subframe_delay() {
        let key = test_key(
            &hex!("42 b4 19 da 6a da 1c 0a 3d 6f 56 a5 e5 dc 59 a7"),
            Gst::new(1176, 120930),
        );
        let past = past_key_for(&key, Adkd::InavCed, 30).unwrap();
        assert_eq!(past.gst_subframe(), key.gst_subframe());
    }

    #[test]
    fn past_key_slow_mac_not_ready_below_delay() {
        let key = test_key(
            &hex!("42 b4 19 da 6a da 1c 0a 3d 6f 56 a5 e5 dc 59 a7"),
            Gst::new(1176, 120930),
        );
        assert!(past_key_for(&key, Adkd::SlowMac, 300).is_none());
        assert!(past_key_for(&key, Adkd::SlowMac, 330).is_some());
    }

    struct RecordingSink {
        exceptions: Vec<String>,
        reports: Vec<Vec<AuthAttempt>>,
    }

    impl Sink for RecordingSink {
        fn on_exception(&mut self, message: &str) {
            self.exceptions.push(message.to_string());
        }
        fn on_subframe_report(&mut self, attempts: &[AuthAttempt]) {
            self.reports.push(attempts.to_vec());
        }
    }

    fn test_config() -> Config {
        let key = p256::ecdsa::VerifyingKey::from(
            &p256::ecdsa::SigningKey::from_bytes(&[1u8; 32].into()).unwrap(),
        );
        Config::new(
            PublicKey::from_p256(key, 1).force_valid(),
            MerkleTree::new([0u8; 32]),
        )
    }

    #[test]
    fn starts_in_initializing_state() {
        let engine = Engine::new(test_config(), Box::new(RecordingSink {
            exceptions: Vec::new(),
            reports: Vec::new(),
        }));
        assert!(!engine.is_ready());
        assert!(engine.newest_key().is_none());
    }

    #[test]
    fn inject_key_moves_engine_to_ready() {
        let key = test_key(
            &hex!("84 1e 1d e4 d4 58 c0 e9 84 24 76 e0 04 66 6c f3"),
            Gst::new(1176, 0x21 * 3600 - 30),
        );
        let mut engine = Engine::new(test_config(), Box::new(RecordingSink {
            exceptions: Vec::new(),
            reports: Vec::new(),
        }));
        engine.inject_key(key);
        assert!(engine.is_ready());
        assert_eq!(engine.newest_key(), Some(key));
    }
}
