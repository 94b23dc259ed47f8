//! Briefing flow coordinators.
//!
//! Three flows: the entry flow pushes the main scene and spawns the
//! result flow once a briefing loads; the result flow presents its scene
//! over-full-screen and fans out into the cheer overlay, the card child
//! flow and the profile deep link; the card flow pushes onto the
//! presented layer. Finish wiring follows one shape everywhere: the
//! parent installs an `on_finish` that removes the finished child from
//! its dependency tree.

use std::sync::{Arc, Weak};

use arbor_core::{CancelBag, MainScheduler};
use arbor_flow::{
    add_dependency, remove_dependency, Coordinator, CoordinatorBase, OverlayConfig,
    OverlayManager, PresentationStyle, Router, WeakSceneView,
};
use parking_lot::Mutex;
use url::Url;

use crate::cheer::{
    CheerFeatureBuildable, CheerMessageKind, CheerSelectionModel, CheerSheet, CheerTargetModel,
};
use crate::deeplink::{member_profile_url, EmbeddedWebScene};

use super::factory::BriefingFeatureBuildable;
use super::models::{BriefingCardModel, BriefingResultModel};
use super::use_case::{BriefingRepository, DailyBriefingUseCase};
use super::view_models::{BriefingCardViewModel, BriefingMainViewModel, BriefingResultViewModel};

// ─── Entry flow ─────────────────────────────────────────────────────────

/// Owns the briefing entry flow: main scene, fetch, result child flow.
pub struct BriefingCoordinator {
    base: CoordinatorBase,
    router: Router,
    factory: Arc<dyn BriefingFeatureBuildable>,
    cheer_factory: Arc<dyn CheerFeatureBuildable>,
    use_case: Arc<DailyBriefingUseCase>,
    community_base_url: Url,
    date_line: String,
    cancel_bag: CancelBag,
    main_view_model: Mutex<Option<Arc<BriefingMainViewModel>>>,
    result_flow: Mutex<Option<Arc<BriefingResultCoordinator>>>,
    weak_self: Weak<Self>,
}

impl BriefingCoordinator {
    /// Create the entry flow on `router`.
    pub fn new(
        router: Router,
        factory: Arc<dyn BriefingFeatureBuildable>,
        cheer_factory: Arc<dyn CheerFeatureBuildable>,
        repository: Arc<dyn BriefingRepository>,
        community_base_url: Url,
        date_line: impl Into<String>,
        scheduler: &MainScheduler,
    ) -> Arc<Self> {
        let use_case = DailyBriefingUseCase::new(scheduler, repository);
        Arc::new_cyclic(|weak_self| Self {
            base: CoordinatorBase::new(scheduler),
            router,
            factory,
            cheer_factory,
            use_case,
            community_base_url,
            date_line: date_line.into(),
            cancel_bag: CancelBag::new(),
            main_view_model: Mutex::new(None),
            result_flow: Mutex::new(None),
            weak_self: weak_self.clone(),
        })
    }

    /// The active main-scene view model, for the shell to bind.
    pub fn main_view_model(&self) -> Option<Arc<BriefingMainViewModel>> {
        self.main_view_model.lock().clone()
    }

    /// The running result flow, if one is active.
    pub fn result_flow(&self) -> Option<Arc<BriefingResultCoordinator>> {
        self.result_flow.lock().clone()
    }

    fn show_main(&self) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        let scene = self.factory.make_briefing_main_scene(&self.date_line);
        scene
            .view_model
            .back_requested()
            .subscribe_weak(&this, |owner, _| {
                owner.router.pop(true);
                owner.base.finish();
            })
            .store_in(&self.cancel_bag);
        scene
            .view_model
            .briefing_requested()
            .subscribe_weak(&this, |owner, _| {
                owner.use_case.fetch_daily_briefing(&owner.date_line);
            })
            .store_in(&self.cancel_bag);
        self.use_case
            .result()
            .subscribe_weak(&this, |owner, model| {
                owner.run_result_flow(model.clone());
            })
            .store_in(&self.cancel_bag);
        self.use_case
            .failure()
            .subscribe_weak(&this, |_owner, error| {
                tracing::warn!(%error, "briefing unavailable, staying on the main scene");
            })
            .store_in(&self.cancel_bag);
        self.router.push(scene.view.clone(), true);
        *self.main_view_model.lock() = Some(scene.view_model.clone());
    }

    fn run_result_flow(&self, model: BriefingResultModel) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        let child = BriefingResultCoordinator::new(
            self.router.clone(),
            self.factory.clone(),
            self.cheer_factory.clone(),
            self.community_base_url.clone(),
            model,
            self.base.scheduler(),
        );
        let parent_weak = Arc::downgrade(&this);
        let child_id = child.base().id();
        child.base().set_on_finish(move || {
            if let Some(parent) = parent_weak.upgrade() {
                *parent.result_flow.lock() = None;
                remove_dependency(parent.as_ref(), child_id);
            }
        });
        *self.result_flow.lock() = Some(child.clone());
        let parent: Arc<dyn Coordinator> = this;
        add_dependency(&parent, child);
    }
}

impl Coordinator for BriefingCoordinator {
    fn base(&self) -> &CoordinatorBase {
        &self.base
    }

    fn start(self: Arc<Self>) {
        self.base.begin();
        self.show_main();
    }
}

// ─── Result flow ────────────────────────────────────────────────────────

/// Owns the briefing result flow and its fan-out.
pub struct BriefingResultCoordinator {
    base: CoordinatorBase,
    router: Router,
    factory: Arc<dyn BriefingFeatureBuildable>,
    cheer_factory: Arc<dyn CheerFeatureBuildable>,
    community_base_url: Url,
    result_model: BriefingResultModel,
    cancel_bag: CancelBag,
    presented_router: Mutex<Option<Router>>,
    presented_root: Mutex<Option<WeakSceneView>>,
    result_view_model: Mutex<Option<Arc<BriefingResultViewModel>>>,
    cheer_sheet: Mutex<Option<CheerSheet>>,
    card_flow: Mutex<Option<Arc<BriefingCardCoordinator>>>,
    web_scene: Mutex<Option<EmbeddedWebScene>>,
    weak_self: Weak<Self>,
}

impl BriefingResultCoordinator {
    /// Create the result flow, presenting on `router`.
    pub fn new(
        router: Router,
        factory: Arc<dyn BriefingFeatureBuildable>,
        cheer_factory: Arc<dyn CheerFeatureBuildable>,
        community_base_url: Url,
        result_model: BriefingResultModel,
        scheduler: &MainScheduler,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            base: CoordinatorBase::new(scheduler),
            router,
            factory,
            cheer_factory,
            community_base_url,
            result_model,
            cancel_bag: CancelBag::new(),
            presented_router: Mutex::new(None),
            presented_root: Mutex::new(None),
            result_view_model: Mutex::new(None),
            cheer_sheet: Mutex::new(None),
            card_flow: Mutex::new(None),
            web_scene: Mutex::new(None),
            weak_self: weak_self.clone(),
        })
    }

    /// The active result-scene view model, for the shell to bind.
    pub fn result_view_model(&self) -> Option<Arc<BriefingResultViewModel>> {
        self.result_view_model.lock().clone()
    }

    /// The cheer sheet currently shown as an overlay, if any.
    pub fn cheer_sheet(&self) -> Option<CheerSheet> {
        self.cheer_sheet.lock().clone()
    }

    /// The running card flow, if one is active.
    pub fn card_flow(&self) -> Option<Arc<BriefingCardCoordinator>> {
        self.card_flow.lock().clone()
    }

    /// The embedded web scene opened by the last profile deep link.
    pub fn web_scene(&self) -> Option<EmbeddedWebScene> {
        self.web_scene.lock().clone()
    }

    fn show_result(&self) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        let scene = self.factory.make_briefing_result_scene(&self.result_model);
        let view_model = scene.view_model.clone();
        view_model
            .back_requested()
            .subscribe_weak(&this, |owner, _| {
                owner.router.dismiss(true);
                owner.base.finish();
            })
            .store_in(&self.cancel_bag);
        view_model
            .cheer_requested()
            .subscribe_weak(&this, |owner, target| {
                owner.show_cheer_sheet(target.clone());
            })
            .store_in(&self.cancel_bag);
        view_model
            .card_flow_requested()
            .subscribe_weak(&this, |owner, card| {
                owner.run_card_flow(card.clone());
            })
            .store_in(&self.cancel_bag);
        view_model
            .profile_requested()
            .subscribe_weak(&this, |owner, member_id| {
                owner.open_member_profile(*member_id);
            })
            .store_in(&self.cancel_bag);

        let presented =
            self.router
                .present(scene.view.clone(), true, PresentationStyle::OverFullScreen);
        *self.presented_root.lock() = Some(scene.view.downgrade());
        *self.presented_router.lock() = Some(presented);
        *self.result_view_model.lock() = Some(view_model);
    }

    fn show_cheer_sheet(&self, target: CheerTargetModel) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        let Some(router) = self.presented_router.lock().clone() else {
            return;
        };
        let host = self.presented_root.lock().clone();
        let kind = if target.is_first_meeting {
            CheerMessageKind::CheerStranger
        } else {
            CheerMessageKind::CheerFriend
        };
        let sheet = self.cheer_factory.make_message_sheet(kind);
        let manager = OverlayManager::new(OverlayConfig::message_template(
            sheet.minimum_content_height,
        ));
        router.show_overlay(&manager, sheet.scene.view.clone(), host.as_ref());

        // One selection closes the sheet and feeds the result scene. The
        // subscription lives in the sheet view's bag, so dismissing the
        // overlay retires it.
        sheet
            .scene
            .view_model
            .selection()
            .subscribe_weak(&this, move |owner, selection| {
                let (message, is_anonymous) = selection.clone();
                owner.cheer_sheet.lock().take();
                if let Some(router) = owner.presented_router.lock().clone() {
                    router.dismiss_overlay(true);
                }
                if let Some(view_model) = owner.result_view_model.lock().clone() {
                    view_model.complete_cheer(CheerSelectionModel {
                        target: target.clone(),
                        message,
                        is_anonymous,
                    });
                }
            })
            .store_in(sheet.scene.view.cancel_bag());
        *self.cheer_sheet.lock() = Some(sheet);
    }

    fn run_card_flow(&self, card_model: BriefingCardModel) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        let Some(router) = self.presented_router.lock().clone() else {
            return;
        };
        let child = BriefingCardCoordinator::new(
            router,
            self.factory.clone(),
            card_model,
            self.base.scheduler(),
        );
        let parent_weak = Arc::downgrade(&this);
        let child_id = child.base().id();
        child.base().set_on_finish(move || {
            if let Some(parent) = parent_weak.upgrade() {
                *parent.card_flow.lock() = None;
                remove_dependency(parent.as_ref(), child_id);
            }
        });
        *self.card_flow.lock() = Some(child.clone());
        let parent: Arc<dyn Coordinator> = this;
        add_dependency(&parent, child);
    }

    fn open_member_profile(&self, member_id: u64) {
        let root_alive = self
            .presented_root
            .lock()
            .as_ref()
            .is_some_and(WeakSceneView::is_alive);
        if !root_alive {
            tracing::debug!("presented surface gone, dropping profile deep link");
            return;
        }
        let Some(router) = self.presented_router.lock().clone() else {
            return;
        };
        let url = member_profile_url(&self.community_base_url, member_id);
        tracing::debug!(%url, "opening member profile");
        let web = EmbeddedWebScene::new(url);
        router.push(web.view.clone(), true);
        *self.web_scene.lock() = Some(web);
    }
}

impl Coordinator for BriefingResultCoordinator {
    fn base(&self) -> &CoordinatorBase {
        &self.base
    }

    fn start(self: Arc<Self>) {
        self.base.begin();
        self.show_result();
    }
}

// ─── Card flow ──────────────────────────────────────────────────────────

/// Owns the card flow pushed onto the presented layer.
pub struct BriefingCardCoordinator {
    base: CoordinatorBase,
    router: Router,
    factory: Arc<dyn BriefingFeatureBuildable>,
    card_model: BriefingCardModel,
    cancel_bag: CancelBag,
    card_view_model: Mutex<Option<Arc<BriefingCardViewModel>>>,
    weak_self: Weak<Self>,
}

impl BriefingCardCoordinator {
    /// Create the card flow on `router`.
    pub fn new(
        router: Router,
        factory: Arc<dyn BriefingFeatureBuildable>,
        card_model: BriefingCardModel,
        scheduler: &MainScheduler,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            base: CoordinatorBase::new(scheduler),
            router,
            factory,
            card_model,
            cancel_bag: CancelBag::new(),
            card_view_model: Mutex::new(None),
            weak_self: weak_self.clone(),
        })
    }

    /// The active card-scene view model, for the shell to bind.
    pub fn card_view_model(&self) -> Option<Arc<BriefingCardViewModel>> {
        self.card_view_model.lock().clone()
    }

    fn show_card(&self) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        let scene = self.factory.make_briefing_card_scene(&self.card_model);
        scene
            .view_model
            .finish_requested()
            .subscribe_weak(&this, |owner, _| {
                owner.router.pop(true);
                owner.base.finish();
            })
            .store_in(&self.cancel_bag);
        self.router.push(scene.view.clone(), true);
        *self.card_view_model.lock() = Some(scene.view_model.clone());
    }
}

impl Coordinator for BriefingCardCoordinator {
    fn base(&self) -> &CoordinatorBase {
        &self.base
    }

    fn start(self: Arc<Self>) {
        self.base.begin();
        self.show_card();
    }
}
